//! Datasource trait definition
//!
//! The controller consumes persistence through this trait only. Methods use
//! RPITIT (Return Position Impl Trait In Traits) so implementations can be
//! written as plain `async fn`.

use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;

use super::error::DatasourceError;

/// Result type for datasource operations
pub type DatasourceResult<T> = std::result::Result<T, DatasourceError>;

/// Domain-opaque record passed through the controller untouched
pub type Record = Value;

/// Query constraints taken verbatim from the request query string
pub type Constraints = HashMap<String, String>;

/// Persistence adapter consumed by the resource controller
///
/// Each operation is assumed to be atomic on its own. `update` must enforce
/// optimistic concurrency: it fails with
/// [`DatasourceErrorKind::ConcurrencyConflict`](super::DatasourceErrorKind::ConcurrencyConflict)
/// unless `old` equals the stored record field-for-field, and leaves the stored
/// record untouched in that case.
///
/// # Example
///
/// ```rust,ignore
/// use resource_controller::datasource::{Constraints, Datasource, DatasourceResult, Record};
///
/// struct RemoteStore { client: reqwest::Client }
///
/// impl Datasource for RemoteStore {
///     async fn query(&self, constraints: &Constraints) -> DatasourceResult<Vec<Record>> {
///         // forward to the remote service
///         todo!()
///     }
///     // ... other methods
/// }
/// ```
pub trait Datasource: Send + Sync + 'static {
    /// Return every record matching the constraints
    fn query(
        &self,
        constraints: &Constraints,
    ) -> impl Future<Output = DatasourceResult<Vec<Record>>> + Send;

    /// Return the record with the given id, or `None` when absent
    fn retrieve(&self, id: &str) -> impl Future<Output = DatasourceResult<Option<Record>>> + Send;

    /// Store a new record and return it with its assigned identifier
    fn insert(&self, record: Record) -> impl Future<Output = DatasourceResult<Record>> + Send;

    /// Replace `old` with `new` under optimistic concurrency
    fn update(
        &self,
        id: &str,
        old: Record,
        new: Record,
    ) -> impl Future<Output = DatasourceResult<()>> + Send;

    /// Remove the record with the given id
    fn delete(&self, id: &str) -> impl Future<Output = DatasourceResult<()>> + Send;
}
