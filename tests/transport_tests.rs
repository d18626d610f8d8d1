//! HTTP transport tests driven through the axum router
//!
//! Run with: cargo test --test transport_tests

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use junggo::mcp::CatalogHandler;
use junggo::transport::{router, HttpState};
use junggo::ServerConfig;

fn app(backend_uri: &str) -> Router {
    let config = ServerConfig::for_backend(backend_uri).unwrap();
    router(HttpState::new(CatalogHandler::from_config(&config).unwrap()))
}

fn post_mcp(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .header("accept", "application/json, text/event-stream")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn initialize_roundtrip() {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-06-18",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1"}
        }
    });
    let (status, value) = send_json(app("http://backend:3000"), post_mcp(body.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["id"], 1);
    assert_eq!(value["result"]["protocolVersion"], "2025-06-18");
    assert!(value["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn notification_gets_accepted_with_empty_body() {
    let body = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    let (status, bytes) = send(app("http://backend:3000"), post_mcp(body.to_string())).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn batch_gets_array() {
    let body = json!([
        {"jsonrpc": "2.0", "id": 1, "method": "ping"},
        {"jsonrpc": "2.0", "method": "notifications/initialized"},
        {"jsonrpc": "2.0", "id": 2, "method": "prompts/list"}
    ]);
    let (status, value) = send_json(app("http://backend:3000"), post_mcp(body.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[1]["result"]["prompts"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (status, value) = send_json(app("http://backend:3000"), post_mcp("{\"jsonrpc\": ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"]["code"], -32700);
    assert_eq!(value["id"], Value::Null);
}

#[tokio::test]
async fn get_and_delete_are_405() {
    for verb in ["GET", "DELETE"] {
        let request = Request::builder()
            .method(verb)
            .uri("/mcp")
            .body(Body::empty())
            .unwrap();
        let (status, value) = send_json(app("http://backend:3000"), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(value["error"]["message"].is_string());
    }
}

#[tokio::test]
async fn health_reports_counts() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, value) = send_json(app("http://backend:3000"), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["name"], "junggo-backend-mcp");
    assert_eq!(value["tools"], 17);
    assert_eq!(value["prompts"], 3);
}

#[tokio::test]
async fn tool_call_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/complaints/c-123/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"message": "hi"}])))
        .expect(1)
        .mount(&server)
        .await;

    let body = json!({
        "jsonrpc": "2.0",
        "id": "call-1",
        "method": "tools/call",
        "params": {"name": "fetch-complaint-responses", "arguments": {"complaintId": "c-123"}}
    });
    let (status, value) = send_json(app(&server.uri()), post_mcp(body.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["id"], "call-1");
    let result = &value["result"];
    assert_eq!(result["structuredContent"], json!([{"message": "hi"}]));
    assert_eq!(result["content"][0]["text"], r#"[{"message":"hi"}]"#);
    assert!(result.get("isError").is_none());
}

#[tokio::test]
async fn backend_failure_is_tool_error_not_rpc_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/complaints/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Complaint not found"))
        .mount(&server)
        .await;

    let body = json!({
        "jsonrpc": "2.0",
        "id": 7,
        "method": "tools/call",
        "params": {"name": "fetch-complaint", "arguments": {"id": "missing"}}
    });
    let (status, value) = send_json(app(&server.uri()), post_mcp(body.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(value.get("error").is_none());
    assert_eq!(value["result"]["isError"], true);
    let text = value["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("BackendResponse:"));
    assert!(text.contains("404"));
}

#[tokio::test]
async fn prompt_get_over_http() {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 4,
        "method": "prompts/get",
        "params": {"name": "assign-complaint-to-agent", "arguments": {"complaintId": "c-9"}}
    });
    let (_, value) = send_json(app("http://backend:3000"), post_mcp(body.to_string())).await;
    let text = value["result"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap();
    assert!(text.contains("c-9"));
    assert!(text.contains("fetch-available-agents"));
}

#[tokio::test]
async fn unknown_method_is_rpc_error() {
    let body = json!({"jsonrpc": "2.0", "id": 5, "method": "sampling/createMessage"});
    let (status, value) = send_json(app("http://backend:3000"), post_mcp(body.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["error"]["code"], -32601);
}
