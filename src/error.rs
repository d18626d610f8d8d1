//! Error types for the Junggo MCP server

use thiserror::Error;

use crate::types::ValidationFailure;

/// Result type alias for Junggo operations
pub type Result<T> = std::result::Result<T, JunggoError>;

/// Main error type for Junggo
#[derive(Error, Debug)]
pub enum JunggoError {
    #[error("{kind} '{name}' is already registered")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} '{name}' is not registered")]
    UnknownName { kind: &'static str, name: String },

    #[error("{}", format_failures(.0))]
    InvalidArguments(Vec<ValidationFailure>),

    #[error("definition '{name}' is malformed: {reason}")]
    MalformedDefinition { name: String, reason: String },

    #[error("backend unreachable at {url}: {reason}")]
    BackendUnavailable { url: String, reason: String },

    #[error("backend returned HTTP {status}: {body}")]
    BackendResponse { status: u16, body: String },

    #[error("backend response is not valid JSON: {0}")]
    MalformedBackendResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JunggoError {
    /// Stable name of the failure kind, shown to agents in error results
    pub fn kind(&self) -> &'static str {
        match self {
            JunggoError::DuplicateName { .. } => "DuplicateName",
            JunggoError::UnknownName { .. } => "UnknownName",
            JunggoError::InvalidArguments(_) => "InvalidArguments",
            JunggoError::MalformedDefinition { .. } => "MalformedDefinition",
            JunggoError::BackendUnavailable { .. } => "BackendUnavailable",
            JunggoError::BackendResponse { .. } => "BackendResponse",
            JunggoError::MalformedBackendResponse(_) => "MalformedBackendResponse",
            JunggoError::Config(_) => "Config",
            JunggoError::Serialization(_) => "Serialization",
            JunggoError::Io(_) => "Io",
        }
    }

    /// Get error code for MCP protocol
    pub fn code(&self) -> i64 {
        match self {
            JunggoError::UnknownName { .. } => -32602,
            JunggoError::InvalidArguments(_) => -32602,
            JunggoError::BackendUnavailable { .. } => -32001,
            JunggoError::BackendResponse { .. } => -32002,
            JunggoError::MalformedBackendResponse(_) => -32003,
            _ => -32603,
        }
    }

    /// Text shown to the caller: kind followed by detail
    pub fn display_text(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

fn format_failures(failures: &[ValidationFailure]) -> String {
    let details: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
    format!(
        "{} invalid argument(s): {}",
        failures.len(),
        details.join("; ")
    )
}
