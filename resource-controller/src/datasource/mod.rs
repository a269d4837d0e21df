//! Datasource abstraction consumed by the resource controller
//!
//! The controller owns no persistence logic. Everything it stores or reads
//! goes through a [`Datasource`] injected at construction.
//!
//! # Features
//!
//! - **Adapter contract**: [`Datasource`] with `query`, `retrieve`, `insert`,
//!   `update` and `delete`
//! - **Optimistic concurrency**: `update` receives the caller's original record
//!   and must reject stale writes with [`DatasourceErrorKind::ConcurrencyConflict`]
//! - **Reference adapter**: [`MemoryDatasource`] for tests and demos
//!
//! # Example
//!
//! ```rust
//! use resource_controller::datasource::{Datasource, MemoryDatasource};
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let ds = MemoryDatasource::new();
//! let saved = ds.insert(json!({"title": "hello"})).await.unwrap();
//! assert!(saved.get("id").is_some());
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f);
//! # }
//! ```

mod error;
mod memory;
mod traits;

pub use error::{DatasourceError, DatasourceErrorKind, DatasourceOperation};
pub use memory::{MemoryDatasource, ID_FIELD};
pub use traits::{Constraints, Datasource, DatasourceResult, Record};
