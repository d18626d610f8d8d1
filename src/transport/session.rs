//! Per-exchange session
//!
//! A session owns exactly one inbound message (single or batch) and moves
//! through `Open → Dispatching → Responded → Closed`. Dropping it closes it,
//! whatever the reason; a closed session never produces output.

use std::fmt;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, field, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::mcp::protocol::{codes, McpRequest, McpResponse};
use crate::mcp::McpHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Dispatching,
    Responded,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Open => "open",
            SessionState::Dispatching => "dispatching",
            SessionState::Responded => "responded",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What the transport should write back
#[derive(Debug, Clone, PartialEq)]
pub enum Exchange {
    /// A single response object or a batch array
    Reply(Value),
    /// Only notifications were received; nothing to write
    Accepted,
    /// The body was not valid JSON
    ParseError(McpResponse),
}

/// One inbound exchange with the protocol handler
pub struct Session {
    id: Uuid,
    state: SessionState,
    span: Span,
}

impl Session {
    pub fn open(transport: &'static str) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!("session", %id, transport, method = field::Empty);
        span.in_scope(|| debug!("session opened"));
        Self {
            id,
            state: SessionState::Open,
            span,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Route `body` to `handler`; `None` once the session is no longer open
    pub async fn exchange<H>(&mut self, handler: &H, body: &[u8]) -> Option<Exchange>
    where
        H: McpHandler + ?Sized,
    {
        if self.state != SessionState::Open {
            self.span
                .in_scope(|| warn!(state = %self.state, "exchange on a session that is not open"));
            return None;
        }
        self.transition(SessionState::Dispatching);

        let exchange = match serde_json::from_slice::<Value>(body) {
            Err(e) => Exchange::ParseError(McpResponse::parse_error(e)),
            Ok(Value::Array(batch)) => {
                self.span.record("method", "batch");
                self.dispatch_batch(handler, batch).await
            }
            Ok(message) => {
                if let Some(method) = message.get("method").and_then(Value::as_str) {
                    self.span.record("method", method);
                }
                match dispatch_one(handler, message).instrument(self.span.clone()).await {
                    Some(response) => Exchange::Reply(to_value(&response)),
                    None => Exchange::Accepted,
                }
            }
        };

        self.transition(SessionState::Responded);
        Some(exchange)
    }

    async fn dispatch_batch<H>(&self, handler: &H, batch: Vec<Value>) -> Exchange
    where
        H: McpHandler + ?Sized,
    {
        if batch.is_empty() {
            let response = McpResponse::error(None, codes::INVALID_REQUEST, "Empty batch");
            return Exchange::Reply(to_value(&response));
        }
        let responses: Vec<Value> = join_all(batch.into_iter().map(|m| dispatch_one(handler, m)))
            .instrument(self.span.clone())
            .await
            .into_iter()
            .flatten()
            .map(|r| to_value(&r))
            .collect();
        if responses.is_empty() {
            Exchange::Accepted
        } else {
            Exchange::Reply(Value::Array(responses))
        }
    }

    /// Close explicitly; later exchanges are suppressed
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            self.transition(SessionState::Closed);
        }
    }

    fn transition(&mut self, next: SessionState) {
        self.span
            .in_scope(|| debug!(from = %self.state, to = %next, "session transition"));
        self.state = next;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let completed = self.state == SessionState::Responded;
        self.close();
        self.span
            .in_scope(|| debug!(completed, "session released"));
    }
}

async fn dispatch_one<H>(handler: &H, message: Value) -> Option<McpResponse>
where
    H: McpHandler + ?Sized,
{
    let id = message.get("id").cloned();
    match serde_json::from_value::<McpRequest>(message) {
        Ok(request) => handler.handle_request(request).await,
        Err(e) => Some(McpResponse::error(
            id,
            codes::INVALID_REQUEST,
            format!("Invalid request: {}", e),
        )),
    }
}

fn to_value(response: &McpResponse) -> Value {
    serde_json::to_value(response).unwrap_or(Value::Null)
}
