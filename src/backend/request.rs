//! Outbound request construction
//!
//! Turns a tool definition plus resolved arguments into a path and an ordered
//! query string. Placeholders are substituted first; whatever arguments remain
//! become query candidates in schema declaration order.

use once_cell::sync::Lazy;
use reqwest::Url;
use serde_json::Value;

use crate::config::QueryPolicy;
use crate::error::{JunggoError, Result};
use crate::types::{
    FailureReason, ResolvedArguments, ToolDefinition, ValidationFailure, PLACEHOLDER_PATTERN,
};

/// HTTP method of a backend request; every tool is a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

/// A path placeholder with no matching argument
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("path placeholder '{{{placeholder}}}' in '{template}' has no matching argument")]
pub struct MissingPathParameter {
    pub placeholder: String,
    pub template: String,
}

/// Why a tool's request could not be built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    MissingPathParameter(#[from] MissingPathParameter),

    /// A substituted value would collapse or empty its path segment
    #[error("{0}")]
    UnroutablePathValue(ValidationFailure),
}

impl BuildError {
    /// A missing placeholder is a definition bug; an unroutable value is the caller's
    pub fn into_error(self, tool: &str) -> JunggoError {
        match self {
            BuildError::MissingPathParameter(missing) => JunggoError::MalformedDefinition {
                name: tool.to_string(),
                reason: missing.to_string(),
            },
            BuildError::UnroutablePathValue(failure) => {
                JunggoError::InvalidArguments(vec![failure])
            }
        }
    }
}

/// Fully-substituted request relative to the backend base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    pub method: Method,
    /// Decoded path segments; encoding happens in [`BackendRequest::url`]
    pub segments: Vec<String>,
    /// Query pairs in declaration order, keys unique
    pub query: Vec<(String, String)>,
}

impl BackendRequest {
    /// Path with each segment percent-encoded, e.g. `/complaints/c-123`
    pub fn path(&self) -> String {
        let mut url = placeholder_base();
        push_segments(&mut url, &self.segments);
        url.path().to_string()
    }

    /// Encoded query string without the leading `?`, `None` when empty
    pub fn query_string(&self) -> Option<String> {
        let mut url = placeholder_base();
        push_query(&mut url, &self.query);
        url.query().map(str::to_string)
    }

    /// Join onto the backend base URL, keeping any base path prefix
    pub fn url(&self, base: &Url) -> Result<Url> {
        if base.cannot_be_a_base() {
            return Err(JunggoError::Config(format!(
                "backend URL '{}' cannot carry a path",
                base
            )));
        }
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        push_segments(&mut url, &self.segments);
        push_query(&mut url, &self.query);
        Ok(url)
    }
}

/// Stand-in origin for rendering a request without a configured backend
static DETACHED_BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://backend.invalid/").unwrap());

fn placeholder_base() -> Url {
    DETACHED_BASE.clone()
}

fn push_segments(url: &mut Url, segments: &[String]) {
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments.iter().map(String::as_str));
    }
}

fn push_query(url: &mut Url, query: &[(String, String)]) {
    if query.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (key, value) in query {
        pairs.append_pair(key, value);
    }
}

/// Build the outbound request for `tool`
///
/// Each template segment maps to exactly one URL segment, so a substituted
/// segment may not be empty, `.` or `..`.
pub fn build(
    tool: &ToolDefinition,
    args: &ResolvedArguments,
    policy: QueryPolicy,
) -> std::result::Result<BackendRequest, BuildError> {
    let mut segments = Vec::new();
    for segment in tool.path.segments() {
        let substituted = substitute(segment, tool, args)?;
        if substituted != segment && is_unroutable(&substituted) {
            return Err(BuildError::UnroutablePathValue(unroutable(segment, &substituted)));
        }
        segments.push(substituted);
    }

    let query = tool
        .query_fields()
        .filter_map(|field| {
            let value = args.get(&field.name)?;
            include_in_query(value, policy)
                .then(|| scalar_to_string(value))
                .flatten()
                .map(|v| (field.name.clone(), v))
        })
        .collect();

    Ok(BackendRequest {
        method: Method::Get,
        segments,
        query,
    })
}

fn substitute(
    segment: &str,
    tool: &ToolDefinition,
    args: &ResolvedArguments,
) -> std::result::Result<String, MissingPathParameter> {
    let mut out = String::with_capacity(segment.len());
    let mut last = 0;
    for caps in PLACEHOLDER_PATTERN.captures_iter(segment) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = args
            .get(name.as_str())
            .and_then(scalar_to_string)
            .ok_or_else(|| MissingPathParameter {
                placeholder: name.as_str().to_string(),
                template: tool.path.to_string(),
            })?;
        out.push_str(&segment[last..whole.start()]);
        out.push_str(&value);
        last = whole.end();
    }
    out.push_str(&segment[last..]);
    Ok(out)
}

fn is_unroutable(segment: &str) -> bool {
    matches!(segment, "" | "." | "..")
}

fn unroutable(template_segment: &str, value: &str) -> ValidationFailure {
    let parameter = PLACEHOLDER_PATTERN
        .captures(template_segment)
        .and_then(|caps| caps.get(1))
        .map(|name| name.as_str())
        .unwrap_or(template_segment);
    ValidationFailure::new(
        parameter,
        "path segment",
        FailureReason::UnroutablePathValue {
            value: value.to_string(),
        },
    )
}

/// Whether a present optional value is sent to the backend
pub fn include_in_query(value: &Value, policy: QueryPolicy) -> bool {
    match policy {
        QueryPolicy::Present => !value.is_null(),
        QueryPolicy::Truthy => is_truthy(value),
    }
}

/// JavaScript truthiness as the backend client has always applied it
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a scalar the way the backend client's `toString()` would
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Some(n.to_string())
            } else {
                n.as_f64().map(format_float)
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
