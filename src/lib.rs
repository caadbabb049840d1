//! MCP server exposing the Freelo project-management REST API as tools over
//! stdio JSON-RPC.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod http;
pub mod mcp;
pub mod resources;
pub mod schema;
pub mod server;
pub mod tools;
pub mod types;

pub use config::Config;
pub use error::{ApiError, ClientError, HandlerError, ToolError};
pub use http::FreeloClient;
pub use tools::Dispatcher;
