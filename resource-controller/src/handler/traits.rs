//! Resource handler trait
//!
//! One capability per CRUD operation. [`DatasourceHandler`](super::DatasourceHandler)
//! is the default implementation; specialized handlers implement the trait
//! themselves and delegate to an inner default handler wherever they keep the
//! stock behaviour.
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_controller::prelude::*;
//!
//! struct ReadOnly<D: Datasource> {
//!     inner: DatasourceHandler<D>,
//! }
//!
//! impl<D: Datasource> ResourceHandler for ReadOnly<D> {
//!     async fn query(&self, req: ResourceRequest) -> HandlerResult {
//!         self.inner.query(req).await
//!     }
//!
//!     async fn retrieve(&self, req: ResourceRequest) -> HandlerResult {
//!         self.inner.retrieve(req).await
//!     }
//!
//!     async fn insert(&self, _req: ResourceRequest) -> HandlerResult {
//!         Ok(Reply::Text(StatusCode::METHOD_NOT_ALLOWED, "read only".into()))
//!     }
//!     // ... update and delete likewise
//! }
//! ```

use std::future::Future;

use super::error::{HandlerError, Operation};
use crate::request::ResourceRequest;
use crate::response::Reply;

/// Result type for handler operations
pub type HandlerResult = std::result::Result<Reply, HandlerError>;

/// Strategy contract for the five collection operations
///
/// Uses RPITIT so implementations are written as `async fn`. All methods
/// must be `Send` futures because they run on the tokio multi-threaded
/// runtime behind the router.
pub trait ResourceHandler: Send + Sync + 'static {
    /// List the collection, passing the query parameters through as constraints
    fn query(&self, req: ResourceRequest) -> impl Future<Output = HandlerResult> + Send;

    /// Fetch a single record by its `id` path parameter
    fn retrieve(&self, req: ResourceRequest) -> impl Future<Output = HandlerResult> + Send;

    /// Create a record from the request body
    fn insert(&self, req: ResourceRequest) -> impl Future<Output = HandlerResult> + Send;

    /// Replace a record; the body is `[old, new]`
    fn update(&self, req: ResourceRequest) -> impl Future<Output = HandlerResult> + Send;

    /// Remove a record by its `id` path parameter
    fn delete(&self, req: ResourceRequest) -> impl Future<Output = HandlerResult> + Send;
}

impl Operation {
    /// Call the method this operation names on `handler`
    pub async fn invoke<H: ResourceHandler>(
        self,
        handler: &H,
        req: ResourceRequest,
    ) -> HandlerResult {
        match self {
            Operation::Query => handler.query(req).await,
            Operation::Retrieve => handler.retrieve(req).await,
            Operation::Insert => handler.insert(req).await,
            Operation::Update => handler.update(req).await,
            Operation::Delete => handler.delete(req).await,
        }
    }
}
