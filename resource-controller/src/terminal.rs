//! Terminal error handler
//!
//! The single consumer of the error channel. Every failure caught by the
//! interception wrapper ends here.
//!
//! Two response modes are available:
//!
//! - [`ErrorResponseMode::NotFound`] (default): log the error and answer
//!   `404` with a plain-text `Not found`, whatever went wrong. Clients cannot
//!   tell a missing record from a conflict or an outage.
//! - [`ErrorResponseMode::Typed`]: pick the status from the [`ErrorKind`] and
//!   answer with a JSON [`ErrorResponse`]. This changes the HTTP surface and
//!   must be enabled explicitly.

use std::fmt;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ErrorResponse;
use crate::handler::{ErrorKind, HandlerError};
use crate::response::{plain_text, NOT_FOUND_TEXT};

/// How the terminal handler turns errors into responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorResponseMode {
    /// Every failure becomes `404 Not found`
    #[default]
    NotFound,
    /// Status and JSON body derived from the error kind
    Typed,
}

impl fmt::Display for ErrorResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Typed => write!(f, "typed"),
        }
    }
}

/// Sole consumer of handler failures
///
/// Implementations must produce exactly one response per call.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Turn a failure into the response sent to the client
    fn handle(&self, error: HandlerError) -> Response;
}

/// Default terminal handler: logs, then responds per [`ErrorResponseMode`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalErrorHandler {
    mode: ErrorResponseMode,
}

impl TerminalErrorHandler {
    /// Create a terminal handler using `mode`
    pub fn new(mode: ErrorResponseMode) -> Self {
        Self { mode }
    }

    /// The configured response mode
    pub fn mode(&self) -> ErrorResponseMode {
        self.mode
    }
}

impl ErrorHandler for TerminalErrorHandler {
    fn handle(&self, error: HandlerError) -> Response {
        // `None` leaves the record_id field out of the event.
        let record_id = error.record_id.as_deref();
        match error.kind {
            ErrorKind::NotFound => tracing::warn!(
                operation = %error.operation,
                kind = %error.kind,
                record_id,
                "Request failed: {}", error.message
            ),
            _ => tracing::error!(
                operation = %error.operation,
                kind = %error.kind,
                record_id,
                "Request failed: {}", error.message
            ),
        }

        match self.mode {
            ErrorResponseMode::NotFound => {
                plain_text(ErrorKind::NotFound.status_code(), NOT_FOUND_TEXT)
            }
            ErrorResponseMode::Typed => {
                let status = error.kind.status_code();
                // Internal details stay in the log.
                let message = match error.kind {
                    ErrorKind::Internal => "An internal error occurred".to_string(),
                    ErrorKind::DatasourceFailure => "Datasource unavailable".to_string(),
                    _ => error.message,
                };
                let body = ErrorResponse::with_code(status, error.kind.error_code(), message);
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Operation;
    use axum::{
        body::to_bytes,
        http::{header, StatusCode},
    };

    async fn body_of(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    fn all_kinds() -> Vec<HandlerError> {
        vec![
            HandlerError::not_found(Operation::Retrieve, "missing"),
            HandlerError::conflict(Operation::Update, "stale"),
            HandlerError::new(Operation::Query, ErrorKind::DatasourceFailure, "down"),
            HandlerError::serialization(Operation::Insert, "bad json"),
            HandlerError::internal(Operation::Delete, "boom"),
        ]
    }

    #[tokio::test]
    async fn test_not_found_mode_collapses_every_kind() {
        let handler = TerminalErrorHandler::default();
        assert_eq!(handler.mode(), ErrorResponseMode::NotFound);

        for error in all_kinds() {
            let response = handler.handle(error);
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                "text/plain; charset=utf-8"
            );
            assert_eq!(body_of(response).await, b"Not found");
        }
    }

    #[tokio::test]
    async fn test_typed_mode_maps_kind_to_status() {
        let handler = TerminalErrorHandler::new(ErrorResponseMode::Typed);
        let expected = [404, 409, 502, 400, 500];

        for (error, status) in all_kinds().into_iter().zip(expected) {
            let code = error.kind.error_code();
            let response = handler.handle(error);
            assert_eq!(response.status().as_u16(), status);

            let body: ErrorResponse = serde_json::from_slice(&body_of(response).await).unwrap();
            assert_eq!(body.status, status);
            assert_eq!(body.code, Some(code));
        }
    }

    #[tokio::test]
    async fn test_typed_mode_hides_internal_messages() {
        let handler = TerminalErrorHandler::new(ErrorResponseMode::Typed);
        let response = handler.handle(HandlerError::internal(Operation::Query, "secret stack"));
        let body: ErrorResponse = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body.error, "An internal error occurred");

        let response = handler.handle(HandlerError::conflict(Operation::Update, "stale original"));
        let body: ErrorResponse = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(body.error, "stale original");
    }

    /// Collects formatted log output for assertions
    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logged(error: HandlerError) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            TerminalErrorHandler::default().handle(error);
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_log_includes_record_id_only_when_known() {
        let line = logged(HandlerError::conflict(Operation::Update, "stale").with_record("r1"));
        assert!(line.contains(r#""record_id":"r1""#), "{line}");
        assert!(!line.contains("Some("), "{line}");

        let line = logged(HandlerError::internal(Operation::Query, "boom"));
        assert!(line.contains("Request failed: boom"), "{line}");
        assert!(!line.contains("record_id"), "{line}");
        assert!(!line.contains("None"), "{line}");
    }

    #[test]
    fn test_mode_serde_names() {
        assert_eq!(
            serde_json::to_string(&ErrorResponseMode::NotFound).unwrap(),
            "\"not_found\""
        );
        let mode: ErrorResponseMode = serde_json::from_str("\"typed\"").unwrap();
        assert_eq!(mode, ErrorResponseMode::Typed);
        assert_eq!(mode.to_string(), "typed");
    }
}
