//! Transports carrying MCP messages to the handler

pub mod http;
pub mod session;
pub mod stdio;

pub use http::{router, HttpState};
pub use session::{Exchange, Session, SessionState};
