//! Streamable HTTP transport (stateless, JSON responses)
//!
//! Every `POST /mcp` opens a fresh [`Session`]; there is no server-side
//! session state, so `GET` (SSE) and `DELETE` are refused.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::session::{Exchange, Session};
use crate::error::Result;
use crate::mcp::protocol::McpResponse;
use crate::mcp::{CatalogHandler, McpHandler};

/// Shared state for the HTTP transport
#[derive(Clone)]
pub struct HttpState {
    handler: Arc<CatalogHandler>,
}

impl HttpState {
    pub fn new(handler: CatalogHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

/// Build the router: `/mcp` and `/health`
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route(
            "/mcp",
            post(handle_post)
                .get(method_not_allowed)
                .delete(method_not_allowed),
        )
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the listener fails
pub async fn serve(addr: SocketAddr, handler: CatalogHandler) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP server listening on http://{}/mcp", listener.local_addr()?);
    axum::serve(listener, router(HttpState::new(handler))).await?;
    Ok(())
}

async fn handle_post(State(state): State<HttpState>, body: Bytes) -> Response {
    let mut session = Session::open("http");
    let handler: &dyn McpHandler = state.handler.as_ref();
    match session.exchange(handler, &body).await {
        Some(Exchange::Reply(value)) => (StatusCode::OK, Json(value)).into_response(),
        Some(Exchange::Accepted) => StatusCode::ACCEPTED.into_response(),
        Some(Exchange::ParseError(response)) => {
            (StatusCode::BAD_REQUEST, Json(response)).into_response()
        }
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn method_not_allowed() -> Response {
    let body = McpResponse::error(
        None,
        -32000,
        "Method not allowed: this server is stateless and only accepts POST",
    );
    (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    name: String,
    version: String,
    tools: usize,
    prompts: usize,
}

async fn health(State(state): State<HttpState>) -> Json<HealthResponse> {
    let registry = state.handler.registry();
    Json(HealthResponse {
        status: "healthy",
        name: state.handler.info().name.clone(),
        version: state.handler.info().version.clone(),
        tools: registry.tools().len(),
        prompts: registry.prompts().len(),
    })
}
