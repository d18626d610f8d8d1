//! Backend access: request construction and the HTTP client

mod client;
pub mod request;

pub use client::{Backend, BackendReply, HttpBackend};
pub use request::{build, BackendRequest, BuildError, Method, MissingPathParameter};
