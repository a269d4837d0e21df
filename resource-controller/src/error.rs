//! Framework error types and the JSON error body

use std::fmt;
use std::net::SocketAddr;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the framework error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running the controller
///
/// Request-level failures are [`HandlerError`](crate::handler::HandlerError)s
/// and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Could not bind the listener
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address we tried to bind
        addr: SocketAddr,
        /// Underlying socket error
        #[source]
        source: std::io::Error,
    },

    /// Configured host is not a valid IP address
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Optional error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// HTTP status code
    pub status: u16,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
            status: status.as_u16(),
        }
    }

    /// Create error response with a code
    pub fn with_code(
        status: StatusCode,
        code: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
            status: status.as_u16(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new(StatusCode::NOT_FOUND, "Record not found");
        assert_eq!(err.status, 404);
        assert_eq!(err.error, "Record not found");
        assert!(err.code.is_none());
    }

    #[test]
    fn test_error_response_with_code() {
        let err = ErrorResponse::with_code(
            StatusCode::CONFLICT,
            "CONCURRENCY_CONFLICT",
            "Stored record changed",
        );
        assert_eq!(err.status, 409);
        assert_eq!(err.code, Some("CONCURRENCY_CONFLICT".to_string()));
        assert_eq!(err.to_string(), "Stored record changed");
    }

    #[test]
    fn test_error_response_skips_missing_code() {
        let json = serde_json::to_value(ErrorResponse::new(StatusCode::BAD_REQUEST, "bad")).unwrap();
        assert_eq!(json, serde_json::json!({"error": "bad", "status": 400}));
    }

    #[test]
    fn test_bind_error_display() {
        let err = Error::Bind {
            addr: SocketAddr::from(([127, 0, 0, 1], 80)),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(err.to_string().contains("127.0.0.1:80"));
    }
}
