//! Junggo - MCP gateway for the complaint-handling backend
//!
//! Exposes the backend's read endpoints as MCP tools, adds guidance prompts
//! for complaint handling, and serves both over streamable HTTP or stdio.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod mcp;
pub mod prompts;
pub mod registry;
pub mod transport;
pub mod types;
pub mod validate;

pub use config::{QueryPolicy, ResourcePaths, ServerConfig};
pub use dispatch::Dispatcher;
pub use error::{JunggoError, Result};
pub use registry::{Registry, RegistryBuilder};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
