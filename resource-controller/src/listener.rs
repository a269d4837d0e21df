//! Network listener with explicit close

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// A bound socket served on a background task
///
/// Dropping the listener stops accepting connections. Connections already
/// accepted keep running on their own tasks.
#[derive(Debug)]
pub struct Listener {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl Listener {
    /// Bind `addr` and start serving `app`
    pub async fn bind(addr: SocketAddr, app: Router) -> Result<Self> {
        let socket = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        let local_addr = socket.local_addr()?;

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(socket, app).await {
                tracing::error!(%local_addr, "Listener failed: {}", e);
            }
        });

        tracing::info!("Listening on {}", local_addr);

        Ok(Self { local_addr, task })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and release the socket
    ///
    /// Returns once the serve task is gone, so the address can be bound again.
    pub async fn close(mut self) {
        self.task.abort();
        if let Err(e) = (&mut self.task).await {
            if e.is_panic() {
                tracing::error!(local_addr = %self.local_addr, "Listener task panicked");
            }
        }
        tracing::info!("Closed listener on {}", self.local_addr);
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Wrap `app` in the tracing and CORS layers from `config`
pub fn apply_middleware(app: Router, config: &Config) -> Router {
    log_middleware_config(config);

    app.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
    .layer(build_cors_layer(&config.middleware.cors_mode))
}

fn log_middleware_config(config: &Config) {
    tracing::debug!("Middleware configuration:");
    tracing::debug!("  - Request tracing: enabled");
    tracing::debug!(
        "  - Request body limit: {} MB",
        config.middleware.body_limit_mb
    );
    tracing::debug!("  - CORS mode: {}", config.middleware.cors_mode);
    tracing::debug!("  - Error responses: {}", config.errors.mode);
}

/// Build CORS layer based on configuration
fn build_cors_layer(cors_mode: &str) -> CorsLayer {
    match cors_mode {
        "permissive" => {
            tracing::debug!("Enabling permissive CORS");
            CorsLayer::permissive()
        }
        "restrictive" => {
            tracing::debug!("Enabling restrictive CORS (default deny)");
            CorsLayer::new()
        }
        "disabled" => {
            tracing::debug!("CORS disabled (using restrictive)");
            CorsLayer::new()
        }
        _ => {
            tracing::warn!("Unknown CORS mode: {}, defaulting to permissive", cors_mode);
            CorsLayer::permissive()
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn loopback() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[tokio::test]
    async fn test_bind_and_close_releases_socket() {
        let listener = Listener::bind(loopback(), Router::new().route("/", get(|| async { "hi" })))
            .await
            .unwrap();
        let addr = listener.local_addr();
        assert_ne!(addr.port(), 0);

        let body = reqwest::get(format!("http://{addr}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "hi");

        listener.close().await;
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());

        // Same port is free again
        let again = Listener::bind(addr, Router::new()).await.unwrap();
        assert_eq!(again.local_addr(), addr);
        again.close().await;
    }

    #[tokio::test]
    async fn test_bind_conflict_is_bind_error() {
        let first = Listener::bind(loopback(), Router::new()).await.unwrap();
        let err = Listener::bind(first.local_addr(), Router::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Bind { .. }));
        first.close().await;
    }

    #[tokio::test]
    async fn test_permissive_cors_answers_preflight() {
        let app = apply_middleware(Router::new().route("/", get(|| async {})), &Config::default());
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/")
                    .header(header::ORIGIN, "http://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
