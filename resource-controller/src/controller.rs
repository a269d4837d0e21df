//! Resource controller and listener lifecycle
//!
//! [`ResourceController`] owns the configuration, the shared handler, the
//! terminal error handler, the route table and at most one active
//! [`Listener`]. The lifecycle is explicit:
//!
//! - [`launch`](ResourceController::launch) builds the router and binds the
//!   configured address, closing any listener that is already active.
//! - [`set_port`](ResourceController::set_port) stores the new port and, when
//!   listening, closes the old listener and then opens the new one.
//! - [`close`](ResourceController::close) releases the socket.
//!
//! Rebinding is not synchronized with requests already in flight on the old
//! listener. Their connections keep running and may finish after the new
//! listener is up.
//!
//! # Example
//!
//! ```rust,no_run
//! use resource_controller::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> resource_controller::Result<()> {
//!     let config = Config::load()?;
//!     ResourceController::with_datasource(MemoryDatasource::new(), config)
//!         .run()
//!         .await
//! }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;

use crate::config::Config;
use crate::datasource::Datasource;
use crate::error::Result;
use crate::handler::{DatasourceHandler, ResourceHandler};
use crate::listener::{apply_middleware, shutdown_signal, Listener};
use crate::routes::RouteTable;
use crate::terminal::{ErrorHandler, TerminalErrorHandler};

/// REST controller for one collection
pub struct ResourceController<H: ResourceHandler> {
    config: Config,
    handler: Arc<H>,
    error_handler: Arc<dyn ErrorHandler>,
    routes: RouteTable,
    listener: Option<Listener>,
}

impl<D: Datasource> ResourceController<DatasourceHandler<D>> {
    /// Controller with the stock CRUD behaviour over `datasource`
    pub fn with_datasource(datasource: D, config: Config) -> Self {
        Self::new(DatasourceHandler::new(datasource), config)
    }

    /// Current datasource
    pub fn datasource(&self) -> Arc<D> {
        self.handler.datasource()
    }

    /// Replace the datasource; takes effect for the next request
    pub fn set_datasource(&self, datasource: Arc<D>) {
        self.handler.set_datasource(datasource);
    }
}

impl<H: ResourceHandler> ResourceController<H> {
    /// Create a controller around `handler`
    ///
    /// The terminal error handler follows `config.errors.mode` and the
    /// routes are [`RouteTable::default`].
    pub fn new(handler: H, config: Config) -> Self {
        Self::from_arc(Arc::new(handler), config)
    }

    /// Create a controller around an already shared handler
    pub fn from_arc(handler: Arc<H>, config: Config) -> Self {
        let error_handler = Arc::new(TerminalErrorHandler::new(config.errors.mode));
        Self {
            config,
            handler,
            error_handler,
            routes: RouteTable::default(),
            listener: None,
        }
    }

    /// Use `routes` instead of the default table at the next launch
    #[must_use]
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Use a custom terminal error handler
    #[must_use]
    pub fn with_error_handler(mut self, error_handler: impl ErrorHandler) -> Self {
        self.error_handler = Arc::new(error_handler);
        self
    }

    /// Shared handler every route dispatches to
    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// Route table used at the next launch
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Configured port; 0 until launch means "any free port"
    pub fn port(&self) -> u16 {
        self.config.service.port
    }

    /// Address of the active listener
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(Listener::local_addr)
    }

    /// Whether a listener is active
    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Build the router served by [`launch`](Self::launch)
    ///
    /// Every route goes through the interception wrapper, unmatched requests
    /// get `404 Not found`, and the tracing and CORS layers wrap the lot.
    pub fn router(&self) -> Router {
        let app = self.routes.build_router(
            Arc::clone(&self.handler),
            Arc::clone(&self.error_handler),
            self.config.body_limit_bytes(),
        );
        apply_middleware(app, &self.config)
    }

    /// Bind the configured address and start serving
    ///
    /// An active listener is closed first. Returns the bound address.
    pub async fn launch(&mut self) -> Result<SocketAddr> {
        self.close().await;

        let addr = self.config.listen_addr()?;
        tracing::info!(
            routes = self.routes.len(),
            "Starting {} on {}",
            self.config.service.name,
            addr
        );

        let listener = Listener::bind(addr, self.router()).await?;
        let local_addr = listener.local_addr();
        self.listener = Some(listener);
        Ok(local_addr)
    }

    /// Change the port, rebinding when a listener is active
    ///
    /// The old listener is closed before the new one opens. Returns the new
    /// address when a rebind happened.
    pub async fn set_port(&mut self, port: u16) -> Result<Option<SocketAddr>> {
        let previous = std::mem::replace(&mut self.config.service.port, port);
        if self.listener.is_none() {
            return Ok(None);
        }

        tracing::info!(from = previous, to = port, "Rebinding listener");
        self.launch().await.map(Some)
    }

    /// Stop accepting connections; a no-op when not listening
    pub async fn close(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.close().await;
        }
    }

    /// Launch, wait for SIGINT or SIGTERM, then close
    pub async fn run(mut self) -> Result<()> {
        self.launch().await?;
        shutdown_signal().await;
        self.close().await;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
