//! Tool invocation pipeline
//!
//! Resolve → Validate → Build → Execute → Normalize. Every stage either hands
//! its output to the next or ends the invocation with a typed error; there are
//! no retries.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{self, Backend};
use crate::config::QueryPolicy;
use crate::error::{JunggoError, Result};
use crate::registry::Registry;
use crate::types::ResultEnvelope;
use crate::validate::validate;

/// Stateless tool dispatcher shared by every session
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    backend: Arc<dyn Backend>,
    policy: QueryPolicy,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, backend: Arc<dyn Backend>, policy: QueryPolicy) -> Self {
        Self {
            registry,
            backend,
            policy,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Invoke tool `name` with the caller's raw arguments
    pub async fn invoke(&self, name: &str, raw_arguments: &Value) -> Result<ResultEnvelope> {
        let tool = self.registry.tool(name)?;

        let args = validate(&tool.input_schema, raw_arguments).map_err(|failures| {
            debug!(tool = name, failures = failures.len(), "argument validation failed");
            JunggoError::InvalidArguments(failures)
        })?;

        let request = backend::build(tool, &args, self.policy).map_err(|e| {
            debug!(tool = name, error = %e, "request construction failed");
            e.into_error(&tool.name)
        })?;
        debug!(tool = name, path = %request.path(), query = request.query.len(), "request built");

        let reply = self.backend.execute(&request).await.map_err(|e| {
            warn!(tool = name, backend = %self.backend.base_url(), error = %e, "backend call failed");
            e
        })?;

        let payload = reply.into_payload().map_err(|e| {
            warn!(tool = name, backend = %self.backend.base_url(), error = %e, "backend reply rejected");
            e
        })?;

        ResultEnvelope::from_payload(payload)
    }
}
