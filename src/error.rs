use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use crate::config::ConfigError;

/// Uniform shape for HTTP error responses from the Freelo API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.error.is_empty(), self.message.is_empty()) {
            (false, false) => write!(f, "{}: {}", self.error, self.message),
            (false, true) => f.write_str(&self.error),
            (true, _) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// No response was received (connect failure, DNS, timeout).
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("Invalid response body: {0}")]
    Decode(String),
    #[error("Invalid client setup: {0}")]
    Build(String),
}

impl ClientError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Api(e) => Some(e.status_code),
            _ => None,
        }
    }
}

/// Errors a tool handler can raise; the dispatcher folds them into
/// [`ToolError::Execution`].
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("Invalid input: {0}")]
    Input(#[from] serde_json::Error),
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid base64 content: {0}")]
    Encoding(#[from] base64::DecodeError),
}

impl HandlerError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HandlerError::Client(c) => c.status_code(),
            _ => None,
        }
    }
}

pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("{0}")]
    ClientNotConfigured(String),
    #[error("Invalid parameters: {}", .0.join(", "))]
    InvalidParams(Vec<String>),
    #[error("{message}")]
    Execution {
        message: String,
        status_code: Option<u16>,
    },
}

impl ToolError {
    pub fn execution(err: &HandlerError) -> Self {
        let message = err.to_string();
        let message = if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        ToolError::Execution {
            message,
            status_code: err.status_code(),
        }
    }

    /// JSON-RPC error code used when this error is reported as a protocol error.
    pub fn rpc_code(&self) -> i64 {
        match self {
            ToolError::UnknownTool(_) => -32601,
            ToolError::InvalidParams(_) => -32602,
            ToolError::ClientNotConfigured(_) | ToolError::Execution { .. } => -32603,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_and_status() {
        let e = ClientError::from(ApiError {
            error: "Not Found".into(),
            message: "Task not found".into(),
            status_code: 404,
        });
        assert_eq!(e.to_string(), "Not Found: Task not found");
        assert_eq!(e.status_code(), Some(404));
        assert_eq!(ClientError::Decode("x".into()).status_code(), None);
    }

    #[test]
    fn execution_wraps_message_and_status() {
        let h = HandlerError::Client(ClientError::Api(ApiError {
            error: "Forbidden".into(),
            message: "No access".into(),
            status_code: 403,
        }));
        match ToolError::execution(&h) {
            ToolError::Execution {
                message,
                status_code,
            } => {
                assert_eq!(message, "Forbidden: No access");
                assert_eq!(status_code, Some(403));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_message_falls_back() {
        let h = HandlerError::Client(ClientError::Api(ApiError {
            error: String::new(),
            message: String::new(),
            status_code: 500,
        }));
        match ToolError::execution(&h) {
            ToolError::Execution { message, .. } => assert_eq!(message, UNKNOWN_ERROR_MESSAGE),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn invalid_params_lists_fields() {
        let e = ToolError::InvalidParams(vec![
            "task_id: Required".into(),
            "name: Expected string".into(),
        ]);
        assert_eq!(
            e.to_string(),
            "Invalid parameters: task_id: Required, name: Expected string"
        );
        assert_eq!(e.rpc_code(), -32602);
    }
}
