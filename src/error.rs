//! Error types for Symquery

use thiserror::Error;

use crate::models::query::BufferId;

pub type SymqueryResult<T> = std::result::Result<T, SymqueryError>;

#[derive(Debug, Error)]
pub enum SymqueryError {
    #[error("{0}")]
    Buffer(#[from] BufferError),

    #[error("{0}")]
    Outline(#[from] OutlineError),

    #[error("{0}")]
    Lsp(#[from] LspError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of the host buffer/window collaborator. These always reach the caller.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("No such buffer: {0}")]
    NotFound(BufferId),

    #[error("No active buffer")]
    NoActiveBuffer,

    #[error("No active window: cursor position unavailable")]
    NoActiveWindow,

    #[error("Invalid line {line} for {buffer} ({line_count} lines)")]
    InvalidLine {
        buffer: BufferId,
        line: usize,
        line_count: usize,
    },
}

/// Reasons a symbol outline could not be obtained.
///
/// The symbol query absorbs every variant and falls back to raw buffer text.
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("No language server with document symbol support")]
    NoCapableServer,

    #[error("Malformed symbol outline: {0}")]
    Malformed(String),

    #[error("{0}")]
    Lsp(#[from] LspError),

    #[error("{0}")]
    Buffer(#[from] BufferError),
}

impl From<serde_json::Error> for OutlineError {
    fn from(err: serde_json::Error) -> Self {
        OutlineError::Malformed(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum LspError {
    #[error("Failed to start server: {0}")]
    ServerStart(String),

    #[error("Server not connected")]
    NotConnected,

    #[error("{server} language server terminated unexpectedly")]
    ServerTerminated { server: String },

    #[error("{0}")]
    Timeout(String),

    #[error("Request cancelled")]
    RequestCancelled,

    #[error("Server error [{code}]: {message}")]
    ServerError { code: i32, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LspError {
    const CANCELLED_ERROR_CODE: i32 = crate::infra::lsp::protocol::error_codes::REQUEST_CANCELLED;

    pub fn error_code(&self) -> i32 {
        match self {
            Self::ServerError { code, .. } => *code,
            Self::ServerTerminated { .. } => -32099,
            Self::Timeout(_) => -32001,
            Self::NotConnected => -32003,
            Self::RequestCancelled => Self::CANCELLED_ERROR_CODE,
            _ => -32000,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::RequestCancelled)
            || matches!(self, Self::ServerError { code, .. } if *code == Self::CANCELLED_ERROR_CODE)
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ServerTerminated { .. }
                | Self::NotConnected
                | Self::Timeout(_)
                | Self::RequestCancelled
        ) || self.is_cancelled()
    }

    pub fn server_error_friendly(code: i32, message: String) -> Self {
        use crate::infra::lsp::protocol::error_codes;

        let friendly_message = match code {
            error_codes::METHOD_NOT_FOUND => format!("Feature not supported: {}", message),
            error_codes::SERVER_NOT_INITIALIZED => {
                "Server initializing. Try again in a moment.".to_string()
            }
            error_codes::CONTENT_MODIFIED => {
                "Content modified during request. Please retry.".to_string()
            }
            _ => message,
        };

        Self::ServerError {
            code,
            message: friendly_message,
        }
    }
}

impl From<crate::infra::lsp::protocol::ResponseError> for LspError {
    fn from(err: crate::infra::lsp::protocol::ResponseError) -> Self {
        LspError::server_error_friendly(err.code, err.message)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_recoverable() {
        let err = LspError::Timeout("test".to_string());
        assert!(err.is_recoverable());
        assert_eq!(err.error_code(), -32001);
    }

    #[test]
    fn test_server_terminated_error() {
        let err = LspError::ServerTerminated {
            server: "rust-analyzer".to_string(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.error_code(), -32099);
        assert_eq!(
            err.to_string(),
            "rust-analyzer language server terminated unexpectedly"
        );
    }

    #[test]
    fn test_cancelled_error() {
        let err = LspError::RequestCancelled;
        assert!(err.is_cancelled());

        let server_cancelled = LspError::ServerError {
            code: -32800,
            message: "cancelled".to_string(),
        };
        assert!(server_cancelled.is_cancelled());
        assert!(server_cancelled.is_recoverable());
    }

    #[test]
    fn test_protocol_error_not_recoverable() {
        assert!(!LspError::Protocol("bad frame".to_string()).is_recoverable());
    }

    #[test]
    fn test_friendly_method_not_found() {
        let err = LspError::server_error_friendly(-32601, "textDocument/documentSymbol".into());
        assert_eq!(
            err.to_string(),
            "Server error [-32601]: Feature not supported: textDocument/documentSymbol"
        );
    }

    #[test]
    fn test_malformed_outline_from_json() {
        let json_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = OutlineError::from(json_err);
        assert!(matches!(err, OutlineError::Malformed(_)));
    }
}
