//! # resource-controller
//!
//! Generic REST resource controller. Maps the five collection operations
//! (query, retrieve, insert, update, delete) onto HTTP verbs and hands
//! persistence to an injected [`Datasource`](datasource::Datasource).
//!
//! ## Features
//!
//! - **Overridable dispatch**: an ordered [`RouteTable`](routes::RouteTable) of
//!   `(verb, pattern, operation)` entries over a [`ResourceHandler`](handler::ResourceHandler) strategy
//! - **Single error channel**: panics and `Err` results from any handler reach
//!   one terminal [`ErrorHandler`](terminal::ErrorHandler) exactly once
//! - **Optimistic concurrency**: updates carry `[old, new]` and the datasource
//!   rejects stale `old` records
//! - **Explicit lifecycle**: launch, rebind to a new port, close
//! - **Layered configuration**: defaults, TOML files and `RESOURCE_` environment variables
//!
//! ## Example
//!
//! ```rust,no_run
//! use resource_controller::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let routes = RouteTable::default().without(Verb::Delete, "/{id}");
//!
//!     ResourceController::with_datasource(MemoryDatasource::new(), config)
//!         .with_routes(routes)
//!         .run()
//!         .await
//! }
//! ```

pub mod config;
pub mod controller;
pub mod datasource;
pub mod error;
pub mod handler;
pub mod intercept;
pub mod listener;
pub mod observability;
pub mod request;
pub mod response;
pub mod routes;
pub mod terminal;

pub use error::{Error, Result};

/// Common imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::controller::ResourceController;
    pub use crate::datasource::{
        Constraints, Datasource, DatasourceError, DatasourceErrorKind, DatasourceOperation,
        DatasourceResult, MemoryDatasource, Record,
    };
    pub use crate::error::{Error, ErrorResponse, Result};
    pub use crate::handler::{
        DatasourceHandler, ErrorKind, HandlerError, HandlerResult, Operation, ResourceHandler,
    };
    pub use crate::observability::{init_tracing, shutdown_tracing};
    pub use crate::request::ResourceRequest;
    pub use crate::response::Reply;
    pub use crate::routes::{RouteEntry, RouteTable, Verb};
    pub use crate::terminal::{ErrorHandler, ErrorResponseMode, TerminalErrorHandler};

    pub use axum::http::StatusCode;
}
