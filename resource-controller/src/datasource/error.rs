//! Datasource error types
//!
//! Structured errors returned by [`Datasource`](super::Datasource) operations.
//! The controller never recovers from these locally; they are converted into
//! [`HandlerError`](crate::handler::HandlerError) and funneled to the terminal
//! error handler.
//!
//! # Example
//!
//! ```rust
//! use resource_controller::datasource::{DatasourceError, DatasourceErrorKind};
//!
//! let error = DatasourceError::not_found("rec_123");
//! assert_eq!(error.kind, DatasourceErrorKind::NotFound);
//! assert_eq!(error.record_id.as_deref(), Some("rec_123"));
//! ```

use std::fmt;

/// Operation being performed when the datasource error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasourceOperation {
    /// Querying a collection with constraints
    Query,
    /// Retrieving a single record by id
    Retrieve,
    /// Inserting a new record
    Insert,
    /// Updating a record under optimistic concurrency
    Update,
    /// Deleting a record
    Delete,
}

impl fmt::Display for DatasourceOperation {
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

/// Category of datasource error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasourceErrorKind {
    /// No record matches the given id
    NotFound,
    /// The caller's view of the record no longer matches the stored one
    ConcurrencyConflict,
    /// Transport or storage failure
    Failure,
    /// The record could not be encoded, decoded or has the wrong shape
    SerializationFailure,
}

impl fmt::Display for DatasourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ConcurrencyConflict => write!(f, "concurrency_conflict"),
            Self::Failure => write!(f, "failure"),
            Self::SerializationFailure => write!(f, "serialization_failure"),
        }
    }
}

/// Structured datasource error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceError {
    /// The operation being performed when the error occurred
    pub operation: DatasourceOperation,
    /// The category of error
    pub kind: DatasourceErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The id of the record involved, when known
    pub record_id: Option<String>,
}

impl DatasourceError {
    /// Create a new datasource error
    pub fn new(
        operation: DatasourceOperation,
        kind: DatasourceErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            record_id: None,
        }
    }

    /// Create a "not found" error for a record id
    pub fn not_found(record_id: impl Into<String>) -> Self {
        Self {
            operation: DatasourceOperation::Retrieve,
            kind: DatasourceErrorKind::NotFound,
            message: "Record not found".to_string(),
            record_id: Some(record_id.into()),
        }
    }

    /// Create an optimistic concurrency conflict for an update
    ///
    /// # Example
    ///
    /// ```rust
    /// use resource_controller::datasource::{DatasourceError, DatasourceOperation};
    ///
    /// let error = DatasourceError::conflict("rec_1");
    /// assert_eq!(error.operation, DatasourceOperation::Update);
    /// ```
    pub fn conflict(record_id: impl Into<String>) -> Self {
        Self {
            operation: DatasourceOperation::Update,
            kind: DatasourceErrorKind::ConcurrencyConflict,
            message: "Stored record does not match the submitted original".to_string(),
            record_id: Some(record_id.into()),
        }
    }

    /// Create a transport or storage failure
    pub fn failure(operation: DatasourceOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DatasourceErrorKind::Failure, message)
    }

    /// Create a serialization failure
    pub fn serialization(operation: DatasourceOperation, message: impl Into<String>) -> Self {
        Self::new(operation, DatasourceErrorKind::SerializationFailure, message)
    }

    /// Attach the record id to an existing error
    #[must_use]
    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: DatasourceOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for DatasourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Datasource {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref id) = self.record_id {
            write!(f, " [record: {}]", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for DatasourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(DatasourceOperation::Query.to_string(), "query");
        assert_eq!(DatasourceOperation::Retrieve.to_string(), "retrieve");
        assert_eq!(DatasourceOperation::Insert.to_string(), "insert");
        assert_eq!(DatasourceOperation::Update.to_string(), "update");
        assert_eq!(DatasourceOperation::Delete.to_string(), "delete");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(DatasourceErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(
            DatasourceErrorKind::ConcurrencyConflict.to_string(),
            "concurrency_conflict"
        );
        assert_eq!(DatasourceErrorKind::Failure.to_string(), "failure");
        assert_eq!(
            DatasourceErrorKind::SerializationFailure.to_string(),
            "serialization_failure"
        );
    }

    #[test]
    fn test_conflict_carries_record() {
        let error = DatasourceError::conflict("rec_9");
        assert_eq!(error.kind, DatasourceErrorKind::ConcurrencyConflict);
        assert_eq!(error.record_id, Some("rec_9".to_string()));
    }

    #[test]
    fn test_display_with_record() {
        let error = DatasourceError::not_found("rec_1").with_operation(DatasourceOperation::Delete);
        let display = error.to_string();
        assert!(display.contains("not_found"));
        assert!(display.contains("delete"));
        assert!(display.contains("[record: rec_1]"));
    }

    #[test]
    fn test_display_without_record() {
        let error = DatasourceError::failure(DatasourceOperation::Query, "connection reset");
        let display = error.to_string();
        assert!(display.contains("connection reset"));
        assert!(!display.contains("["));
    }

    #[test]
    fn test_serialization_error_keeps_caller_operation() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = DatasourceError::serialization(DatasourceOperation::Insert, err.to_string());
        assert_eq!(error.kind, DatasourceErrorKind::SerializationFailure);
        assert_eq!(error.operation, DatasourceOperation::Insert);
        assert!(error.to_string().starts_with("Datasource serialization_failure error during insert"));
    }
}
