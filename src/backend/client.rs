//! HTTP client for the complaint backend

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use super::request::BackendRequest;
use crate::config::BackendConfig;
use crate::error::{JunggoError, Result};

/// Raw reply from the backend before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendReply {
    pub status: u16,
    pub body: String,
}

impl BackendReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Non-2xx becomes `BackendResponse`, an unparseable body `MalformedBackendResponse`
    pub fn into_payload(self) -> Result<Value> {
        if !self.is_success() {
            return Err(JunggoError::BackendResponse {
                status: self.status,
                body: self.body,
            });
        }
        serde_json::from_str(&self.body)
            .map_err(|e| JunggoError::MalformedBackendResponse(e.to_string()))
    }
}

/// Something that can execute a [`BackendRequest`]
///
/// Transport failures map to `BackendUnavailable`; any HTTP status comes back
/// as a reply so the dispatcher owns status handling.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn execute(&self, request: &BackendRequest) -> Result<BackendReply>;

    /// Base URL used for logging and error messages
    fn base_url(&self) -> &Url;
}

/// reqwest-backed backend client
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("junggo-mcp/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| JunggoError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn execute(&self, request: &BackendRequest) -> Result<BackendReply> {
        let url = request.url(&self.base_url)?;
        debug!(method = request.method.as_str(), %url, "backend request");

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| unavailable(&url, &e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| unavailable(&url, &e))?;
        debug!(%url, status, bytes = body.len(), "backend reply");

        Ok(BackendReply { status, body })
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}

fn unavailable(url: &Url, err: &reqwest::Error) -> JunggoError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    JunggoError::BackendUnavailable {
        url: url.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_parses_json() {
        let reply = BackendReply {
            status: 200,
            body: r#"{"total": 3}"#.to_string(),
        };
        assert_eq!(reply.into_payload().unwrap(), json!({"total": 3}));
    }

    #[test]
    fn test_non_success_keeps_status_and_body() {
        let reply = BackendReply {
            status: 404,
            body: "Not Found".to_string(),
        };
        match reply.into_payload().unwrap_err() {
            JunggoError::BackendResponse { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Not Found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let reply = BackendReply {
            status: 200,
            body: "<html>".to_string(),
        };
        assert_eq!(reply.into_payload().unwrap_err().kind(), "MalformedBackendResponse");
    }

    #[test]
    fn test_empty_body_is_malformed() {
        let reply = BackendReply {
            status: 204,
            body: String::new(),
        };
        assert_eq!(reply.into_payload().unwrap_err().kind(), "MalformedBackendResponse");
    }
}
