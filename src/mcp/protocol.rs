//! MCP JSON-RPC protocol types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::JunggoError;
use crate::types::{PromptDefinition, ResourceTemplate, ResultEnvelope, ToolDefinition};

/// Protocol versions this server can speak, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// JSON-RPC error codes used outside [`JunggoError::code`]
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
}

/// MCP JSON-RPC request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl McpRequest {
    /// A request without an id expects no response
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// MCP JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

/// MCP error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Create error from JunggoError
    pub fn from_error(id: Option<Value>, err: &JunggoError) -> Self {
        let mut response = Self::error(id, err.code(), err.display_text());
        if let (Some(error), JunggoError::InvalidArguments(failures)) = (&mut response.error, err) {
            error.data = serde_json::to_value(failures).ok();
        }
        response
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::error(None, codes::PARSE_ERROR, format!("Parse error: {}", detail))
    }
}

/// Standard MCP methods
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const PING: &str = "ping";
    pub const LIST_TOOLS: &str = "tools/list";
    pub const CALL_TOOL: &str = "tools/call";
    pub const LIST_PROMPTS: &str = "prompts/list";
    pub const GET_PROMPT: &str = "prompts/get";
    pub const LIST_RESOURCES: &str = "resources/list";
    pub const LIST_RESOURCE_TEMPLATES: &str = "resources/templates/list";
    pub const READ_RESOURCE: &str = "resources/read";
    pub const NOTIFICATION_PREFIX: &str = "notifications/";
}

/// MCP initialize result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

/// Server capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: Option<ListCapability>,
    pub prompts: Option<ListCapability>,
    pub resources: Option<ResourcesCapability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCapability {
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesCapability {
    pub subscribe: bool,
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server info
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl InitializeResult {
    /// Echo the client's version when supported, otherwise offer the newest
    pub fn negotiate(requested: Option<&str>, server_info: ServerInfo) -> Self {
        let protocol_version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
            .to_string();
        Self {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: Some(ListCapability {
                    list_changed: false,
                }),
                prompts: Some(ListCapability {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
            },
            server_info,
        }
    }
}

/// Entry of a `tools/list` result
#[derive(Debug, Clone, Serialize)]
pub struct ToolListing {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

impl From<&ToolDefinition> for ToolListing {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            name: tool.name.clone(),
            title: tool.title.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.to_json_schema(),
            output_schema: tool.output_schema.as_ref().map(|s| s.to_json_schema()),
        }
    }
}

/// Tool call result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolCallResult {
    /// Successful call: the text plus the structured payload it serializes
    pub fn envelope(envelope: ResultEnvelope) -> Self {
        let (text, structured_content) = envelope.into_parts();
        Self {
            content: vec![ToolContent::Text { text }],
            structured_content,
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(err: &JunggoError) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: err.display_text(),
            }],
            structured_content: None,
            is_error: Some(true),
        }
    }
}

/// Entry of a `prompts/list` result
#[derive(Debug, Clone, Serialize)]
pub struct PromptListing {
    pub name: String,
    pub title: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
}

impl From<&PromptDefinition> for PromptListing {
    fn from(prompt: &PromptDefinition) -> Self {
        Self {
            name: prompt.name.clone(),
            title: prompt.title.clone(),
            description: prompt.description.clone(),
            arguments: prompt
                .args_schema
                .fields()
                .iter()
                .map(|f| PromptArgument {
                    name: f.name.clone(),
                    description: f.description.clone(),
                    required: f.required,
                })
                .collect(),
        }
    }
}

/// `prompts/get` result: one user message carrying the guidance text
pub fn get_prompt_result(description: &str, guidance: &ResultEnvelope) -> Value {
    json!({
        "description": description,
        "messages": [{
            "role": "user",
            "content": { "type": "text", "text": guidance.display_text() },
        }],
    })
}

/// Entry of a `resources/templates/list` result
#[derive(Debug, Clone, Serialize)]
pub struct ResourceTemplateListing {
    #[serde(rename = "uriTemplate")]
    pub uri_template: String,
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl From<&ResourceTemplate> for ResourceTemplateListing {
    fn from(resource: &ResourceTemplate) -> Self {
        Self {
            uri_template: resource.uri_template.as_str().to_string(),
            name: resource.name.clone(),
            title: resource.title.clone(),
            description: resource.description.clone(),
            mime_type: resource.mime_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceContent {
    pub uri: String,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FailureReason, ValidationFailure};

    fn info() -> ServerInfo {
        ServerInfo {
            name: "junggo-backend-mcp".to_string(),
            version: "0.0.0".to_string(),
        }
    }

    #[test]
    fn test_version_negotiation() {
        assert_eq!(
            InitializeResult::negotiate(Some("2024-11-05"), info()).protocol_version,
            "2024-11-05"
        );
        assert_eq!(
            InitializeResult::negotiate(Some("1999-01-01"), info()).protocol_version,
            SUPPORTED_PROTOCOL_VERSIONS[0]
        );
        assert_eq!(
            InitializeResult::negotiate(None, info()).protocol_version,
            SUPPORTED_PROTOCOL_VERSIONS[0]
        );
    }

    #[test]
    fn test_error_response_has_no_result() {
        let response = McpResponse::error(Some(json!(1)), codes::METHOD_NOT_FOUND, "nope");
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("result").is_none());
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["id"], 1);
    }

    #[test]
    fn test_invalid_arguments_carry_failures() {
        let err = JunggoError::InvalidArguments(vec![ValidationFailure::new(
            "complaintId",
            "string",
            FailureReason::Missing,
        )]);
        let response = McpResponse::from_error(Some(json!(2)), &err);
        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.starts_with("InvalidArguments:"));
        assert_eq!(error.data.unwrap()[0]["parameter"], "complaintId");
    }

    #[test]
    fn test_tool_result_shapes() {
        let ok = ToolCallResult::envelope(ResultEnvelope::from_payload(json!({"a": 1})).unwrap());
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], r#"{"a":1}"#);
        assert_eq!(value["structuredContent"], json!({"a": 1}));
        assert!(value.get("isError").is_none());

        let err = ToolCallResult::error(&JunggoError::MalformedBackendResponse("eof".into()));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["isError"], true);
        assert!(value.get("structuredContent").is_none());
    }
}
