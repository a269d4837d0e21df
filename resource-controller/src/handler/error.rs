//! Handler error types
//!
//! Every failure inside a CRUD handler, whether returned as `Err` or raised
//! as a panic, is represented as a [`HandlerError`] and delivered to the
//! terminal error handler. The error keeps its [`ErrorKind`] so the boundary
//! can choose a status code.
//!
//! # Example
//!
//! ```rust
//! use resource_controller::handler::{ErrorKind, HandlerError, Operation};
//!
//! let error = HandlerError::conflict(Operation::Update, "stale original");
//! assert_eq!(error.kind, ErrorKind::ConcurrencyConflict);
//! assert_eq!(error.kind.status_code().as_u16(), 409);
//! ```

use std::any::Any;
use std::fmt;

use axum::http::StatusCode;

use crate::datasource::{DatasourceError, DatasourceErrorKind, DatasourceOperation};

/// Controller operation a route is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// List the collection, filtered by query parameters
    Query,
    /// Fetch one record by id
    Retrieve,
    /// Create a record
    Insert,
    /// Replace a record under optimistic concurrency
    Update,
    /// Remove a record
    Delete,
}

impl Operation {
    /// All operations, in default route order
    pub const ALL: [Operation; 5] = [
        Operation::Query,
        Operation::Retrieve,
        Operation::Insert,
        Operation::Update,
        Operation::Delete,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Retrieve => write!(f, "retrieve"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

impl From<DatasourceOperation> for Operation {
    fn from(op: DatasourceOperation) -> Self {
        match op {
            DatasourceOperation::Query => Self::Query,
            DatasourceOperation::Retrieve => Self::Retrieve,
            DatasourceOperation::Insert => Self::Insert,
            DatasourceOperation::Update => Self::Update,
            DatasourceOperation::Delete => Self::Delete,
        }
    }
}

/// Category of handler failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No matching record or route
    NotFound,
    /// Old record did not match the stored one on update
    ConcurrencyConflict,
    /// Transport or storage error in the datasource
    DatasourceFailure,
    /// Malformed request body or parameters
    SerializationFailure,
    /// Handler panicked or broke an internal invariant
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ConcurrencyConflict => write!(f, "concurrency_conflict"),
            Self::DatasourceFailure => write!(f, "datasource_failure"),
            Self::SerializationFailure => write!(f, "serialization_failure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

impl ErrorKind {
    /// Status code used when the terminal handler reports errors by kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ConcurrencyConflict => StatusCode::CONFLICT,
            Self::DatasourceFailure => StatusCode::BAD_GATEWAY,
            Self::SerializationFailure => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code, e.g. `CONCURRENCY_CONFLICT`
    #[must_use]
    pub fn error_code(&self) -> String {
        self.to_string().to_uppercase()
    }
}

/// Structured handler error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    /// The operation that failed
    pub operation: Operation,
    /// The category of error
    pub kind: ErrorKind,
    /// Human-readable error message, preserved from the original failure
    pub message: String,
    /// The record id involved, when known
    pub record_id: Option<String>,
}

impl HandlerError {
    /// Create a new handler error
    pub fn new(operation: Operation, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            record_id: None,
        }
    }

    /// Create a "not found" error
    pub fn not_found(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::NotFound, message)
    }

    /// Create a concurrency conflict error
    pub fn conflict(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::ConcurrencyConflict, message)
    }

    /// Create a malformed-input error
    pub fn serialization(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::SerializationFailure, message)
    }

    /// Create an internal error
    pub fn internal(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::Internal, message)
    }

    /// Build an internal error from a caught panic payload
    pub fn from_panic(operation: Operation, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self::internal(operation, message)
    }

    /// Attach the record id
    #[must_use]
    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Handler {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref id) = self.record_id {
            write!(f, " [record: {}]", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for HandlerError {}

impl From<DatasourceError> for HandlerError {
    fn from(err: DatasourceError) -> Self {
        let kind = match err.kind {
            DatasourceErrorKind::NotFound => ErrorKind::NotFound,
            DatasourceErrorKind::ConcurrencyConflict => ErrorKind::ConcurrencyConflict,
            DatasourceErrorKind::Failure => ErrorKind::DatasourceFailure,
            DatasourceErrorKind::SerializationFailure => ErrorKind::SerializationFailure,
        };
        Self {
            operation: err.operation.into(),
            kind,
            message: err.message,
            record_id: err.record_id,
        }
    }
}
