//! Method routing for MCP requests

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::protocol::{
    codes, get_prompt_result, methods, InitializeResult, McpRequest, McpResponse, PromptListing,
    ResourceContent, ResourceTemplateListing, ServerInfo, ToolCallResult, ToolListing,
};
use crate::backend::{Backend, HttpBackend};
use crate::catalog::default_registry;
use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::prompts::PromptOrchestrator;
use crate::registry::Registry;

/// Trait for handling MCP requests
#[async_trait]
pub trait McpHandler: Send + Sync {
    /// `None` for notifications, which never get a response
    async fn handle_request(&self, request: McpRequest) -> Option<McpResponse>;
}

/// Serves the registered catalog
#[derive(Clone)]
pub struct CatalogHandler {
    info: ServerInfo,
    dispatcher: Dispatcher,
    prompts: PromptOrchestrator,
}

impl CatalogHandler {
    pub fn new(info: ServerInfo, dispatcher: Dispatcher) -> Self {
        let prompts = PromptOrchestrator::new(dispatcher.registry().clone());
        Self {
            info,
            dispatcher,
            prompts,
        }
    }

    /// Build the default catalog against the configured HTTP backend
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        config.validate()?;
        let registry = default_registry(config)?;
        let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config.backend)?);
        let dispatcher = Dispatcher::new(registry, backend, config.query_policy);
        Ok(Self::new(
            ServerInfo {
                name: config.name.clone(),
                version: config.version.clone(),
            },
            dispatcher,
        ))
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    pub fn registry(&self) -> &Arc<Registry> {
        self.dispatcher.registry()
    }

    async fn route(&self, request: &McpRequest) -> McpResponse {
        let id = request.id.clone();
        let params = &request.params;

        match request.method.as_str() {
            methods::INITIALIZE => {
                let requested = params.get("protocolVersion").and_then(Value::as_str);
                let result = InitializeResult::negotiate(requested, self.info.clone());
                to_response(id, &result)
            }
            methods::PING | methods::INITIALIZED => McpResponse::success(id, json!({})),
            methods::LIST_TOOLS => {
                let tools: Vec<ToolListing> =
                    self.registry().tools().iter().map(ToolListing::from).collect();
                McpResponse::success(id, json!({ "tools": tools }))
            }
            methods::CALL_TOOL => {
                let Some(name) = params.get("name").and_then(Value::as_str) else {
                    return McpResponse::error(id, codes::INVALID_PARAMS, "Missing tool name");
                };
                let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
                let result = match self.dispatcher.invoke(name, &arguments).await {
                    Ok(envelope) => ToolCallResult::envelope(envelope),
                    Err(e) => ToolCallResult::error(&e),
                };
                to_response(id, &result)
            }
            methods::LIST_PROMPTS => {
                let prompts: Vec<PromptListing> = self
                    .registry()
                    .prompts()
                    .iter()
                    .map(PromptListing::from)
                    .collect();
                McpResponse::success(id, json!({ "prompts": prompts }))
            }
            methods::GET_PROMPT => {
                let Some(name) = params.get("name").and_then(Value::as_str) else {
                    return McpResponse::error(id, codes::INVALID_PARAMS, "Missing prompt name");
                };
                let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);
                match self.prompts.render(name, &arguments) {
                    Ok(rendered) => {
                        let description = rendered.description.clone();
                        let guidance = rendered.into_envelope();
                        McpResponse::success(id, get_prompt_result(&description, &guidance))
                    }
                    Err(e) => McpResponse::from_error(id, &e),
                }
            }
            methods::LIST_RESOURCES => McpResponse::success(id, json!({ "resources": [] })),
            methods::LIST_RESOURCE_TEMPLATES => {
                let templates: Vec<ResourceTemplateListing> = self
                    .registry()
                    .resource_templates()
                    .iter()
                    .map(ResourceTemplateListing::from)
                    .collect();
                McpResponse::success(id, json!({ "resourceTemplates": templates }))
            }
            methods::READ_RESOURCE => {
                let Some(uri) = params.get("uri").and_then(Value::as_str) else {
                    return McpResponse::error(id, codes::INVALID_PARAMS, "Missing resource uri");
                };
                match self.registry().resource_for_uri(uri) {
                    Ok(found) => {
                        let content = ResourceContent {
                            uri: uri.to_string(),
                            mime_type: found.template.mime_type.clone(),
                            text: (found.template.render)(&found.variables),
                        };
                        McpResponse::success(id, json!({ "contents": [content] }))
                    }
                    Err(e) => McpResponse::from_error(id, &e),
                }
            }
            other => McpResponse::error(
                id,
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", other),
            ),
        }
    }
}

#[async_trait]
impl McpHandler for CatalogHandler {
    async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "notification");
            if !request.method.starts_with(methods::NOTIFICATION_PREFIX) {
                self.route(&request).await;
            }
            return None;
        }
        Some(self.route(&request).await)
    }
}

fn to_response(id: Option<Value>, result: &impl serde::Serialize) -> McpResponse {
    match serde_json::to_value(result) {
        Ok(value) => McpResponse::success(id, value),
        Err(e) => McpResponse::error(id, -32603, format!("Serialization error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BACKEND_URL;

    fn handler() -> CatalogHandler {
        let config = ServerConfig::for_backend(DEFAULT_BACKEND_URL).unwrap();
        CatalogHandler::from_config(&config).unwrap()
    }

    fn request(id: i64, method: &str, params: Value) -> McpRequest {
        McpRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(id)),
            method: method.to_string(),
            params,
        }
    }

    async fn result_of(method: &str, params: Value) -> Value {
        let response = handler()
            .handle_request(request(1, method, params))
            .await
            .unwrap();
        assert!(response.error.is_none(), "{:?}", response.error);
        response.result.unwrap()
    }

    #[tokio::test]
    async fn test_initialize_advertises_prompts() {
        let result = result_of(methods::INITIALIZE, json!({"protocolVersion": "2025-03-26"})).await;
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert!(result["capabilities"]["prompts"].is_object());
        assert_eq!(result["serverInfo"]["name"], "junggo-backend-mcp");
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let notification = McpRequest {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: methods::INITIALIZED.to_string(),
            params: Value::Null,
        };
        assert!(handler().handle_request(notification).await.is_none());
    }

    #[tokio::test]
    async fn test_notification_method_with_id_still_answered() {
        let response = handler()
            .handle_request(request(9, methods::INITIALIZED, Value::Null))
            .await
            .unwrap();
        assert_eq!(response.id, json!(9));
        assert!(response.error.is_none());

        let response = handler()
            .handle_request(request(10, "notifications/cancelled", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.id, json!(10));
        assert_eq!(response.error.unwrap().code, codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tools_list_includes_titles_and_output_schema() {
        let result = result_of(methods::LIST_TOOLS, Value::Null).await;
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 17);
        assert_eq!(tools[0]["name"], "fetch-user");
        assert_eq!(tools[0]["title"], "User Fetcher");
        assert!(tools[0]["outputSchema"]["properties"]["address"].is_object());
        assert!(tools[1].get("outputSchema").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let result = result_of(
            methods::CALL_TOOL,
            json!({"name": "does-not-exist", "arguments": {}}),
        )
        .await;
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("UnknownName:"));
        assert!(text.contains("does-not-exist"));
    }

    #[tokio::test]
    async fn test_prompt_get_applies_default_days() {
        let result = result_of(
            methods::GET_PROMPT,
            json!({"name": "analyze-complaint-trend", "arguments": {}}),
        )
        .await;
        let message = &result["messages"][0];
        assert_eq!(message["role"], "user");
        assert!(message["content"]["text"].as_str().unwrap().contains("최근 7일간"));
    }

    #[tokio::test]
    async fn test_prompt_missing_argument_is_rpc_error() {
        let response = handler()
            .handle_request(request(
                3,
                methods::GET_PROMPT,
                json!({"name": "process-complaint", "arguments": {}}),
            ))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("complaintId"));
    }

    #[tokio::test]
    async fn test_resource_read_greeting() {
        let result = result_of(methods::READ_RESOURCE, json!({"uri": "greeting://Mina"})).await;
        assert_eq!(result["contents"][0]["text"], "Hello, Mina!");
        assert_eq!(result["contents"][0]["uri"], "greeting://Mina");
    }

    #[tokio::test]
    async fn test_resources_list_is_empty_but_templates_listed() {
        let result = result_of(methods::LIST_RESOURCES, Value::Null).await;
        assert_eq!(result["resources"], json!([]));
        let result = result_of(methods::LIST_RESOURCE_TEMPLATES, Value::Null).await;
        assert_eq!(result["resourceTemplates"][0]["uriTemplate"], "greeting://{name}");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = handler()
            .handle_request(request(9, "tools/destroy", Value::Null))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
        assert_eq!(response.id, json!(9));
    }
}
