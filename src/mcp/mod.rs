//! MCP (Model Context Protocol) server implementation
//!
//! JSON-RPC 2.0 over streamable HTTP or stdio.

pub mod handler;
pub mod protocol;

pub use handler::{CatalogHandler, McpHandler};
pub use protocol::{methods, InitializeResult, McpRequest, McpResponse, ServerInfo, ToolCallResult};
