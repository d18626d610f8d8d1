//! Server configuration
//!
//! The binary fills these from CLI flags and environment variables; tests
//! build them directly.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{JunggoError, Result};

/// Default backend base URL (docker-compose service name)
pub const DEFAULT_BACKEND_URL: &str = "http://backend:3000";

/// Default MCP listening port
pub const DEFAULT_PORT: u16 = 4000;

/// Which optional query values reach the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPolicy {
    /// Drop `0`, `""` and `false`; matches what the backend has always received
    #[default]
    Truthy,
    /// Send every supplied value, including zero, empty and false
    Present,
}

impl FromStr for QueryPolicy {
    type Err = JunggoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "truthy" => Ok(QueryPolicy::Truthy),
            "present" => Ok(QueryPolicy::Present),
            other => Err(JunggoError::Config(format!(
                "unknown query policy '{}' (expected truthy or present)",
                other
            ))),
        }
    }
}

impl fmt::Display for QueryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryPolicy::Truthy => f.write_str("truthy"),
            QueryPolicy::Present => f.write_str("present"),
        }
    }
}

/// Backend resource names that differ between deployments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePaths {
    /// Customer user collection, e.g. `customer-users`
    pub users: String,
    /// Customer activity log collection, e.g. `customer-user-logs`
    pub user_logs: String,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            users: "customer-users".to_string(),
            user_logs: "customer-user-logs".to_string(),
        }
    }
}

impl ResourcePaths {
    fn validate(&self) -> Result<()> {
        for (label, value) in [("user resource", &self.users), ("user log resource", &self.user_logs)] {
            if value.is_empty() || value.contains('/') || value.contains('{') {
                return Err(JunggoError::Config(format!(
                    "{} must be a single path segment, got '{}'",
                    label, value
                )));
            }
        }
        Ok(())
    }
}

/// Outbound backend connection settings
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    /// `None` leaves the client without a timeout
    pub timeout: Option<Duration>,
}

impl BackendConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| JunggoError::Config(format!("invalid backend URL '{}': {}", base_url, e)))?;
        let config = Self {
            base_url,
            timeout: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    fn validate(&self) -> Result<()> {
        match self.base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(JunggoError::Config(format!(
                    "backend URL must be http or https, got '{}'",
                    other
                )))
            }
        }
        if self.base_url.cannot_be_a_base() {
            return Err(JunggoError::Config(format!(
                "backend URL '{}' cannot carry a path",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub bind: SocketAddr,
    pub backend: BackendConfig,
    pub resources: ResourcePaths,
    pub query_policy: QueryPolicy,
}

impl ServerConfig {
    /// Configuration pointing at `backend_url` with every other setting defaulted
    pub fn for_backend(backend_url: &str) -> Result<Self> {
        Ok(Self {
            name: "junggo-backend-mcp".to_string(),
            version: crate::VERSION.to_string(),
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            backend: BackendConfig::new(backend_url)?,
            resources: ResourcePaths::default(),
            query_policy: QueryPolicy::default(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        self.resources.validate()?;
        if self.name.trim().is_empty() {
            return Err(JunggoError::Config("server name must not be empty".to_string()));
        }
        Ok(())
    }
}
