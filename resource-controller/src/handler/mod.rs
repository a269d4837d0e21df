//! CRUD handlers for a REST collection
//!
//! This module holds the Strategy contract the controller dispatches to and
//! its default, datasource-backed implementation.
//!
//! # Features
//!
//! - **Strategy contract**: [`ResourceHandler`] with one method per operation
//! - **Default behaviour**: [`DatasourceHandler`] forwards to a [`Datasource`](crate::datasource::Datasource)
//! - **Method references**: [`Operation`] names a handler method so route
//!   tables can store it as plain data
//! - **Error channel**: [`HandlerError`] carries an [`ErrorKind`] to the terminal handler
//!
//! # Example
//!
//! ```rust
//! use resource_controller::datasource::MemoryDatasource;
//! use resource_controller::handler::{DatasourceHandler, Operation};
//! use resource_controller::request::ResourceRequest;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let handler = DatasourceHandler::new(MemoryDatasource::new());
//! let reply = Operation::Query.invoke(&handler, ResourceRequest::new()).await;
//! assert!(reply.is_ok());
//! # });
//! ```

mod datasource_handler;
mod error;
mod traits;

pub use datasource_handler::{DatasourceHandler, FAVICON_ID};
pub use error::{ErrorKind, HandlerError, Operation};
pub use traits::{HandlerResult, ResourceHandler};
