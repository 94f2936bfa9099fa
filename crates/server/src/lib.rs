//! # Server
//!
//! HTTP front end.
//!
//! Routes:
//! - `POST /api/send`: `{ account?, message, test? }` -> `{ info }`
//! - `POST /api/bulk`: `{ account?, messages, test? }` -> `{ outputs }` in input order
//! - anything else: 404
//!
//! Malformed bodies get a 400 with a plain-text reason; every other failure
//! is a bare 500.

pub mod body;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

use std::future::Future;

use axum::middleware;
use axum::routing::post;
use axum::Router;
use contracts::Connector;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tracing::{error, info};

pub use config::ServerArgs;
pub use error::ApiError;
pub use logging::{RequestCounter, RequestId};
pub use state::AppState;

/// Build the application router
pub fn router<C: Connector + 'static>(state: AppState<C>) -> Router {
    let requests = state.requests.clone();
    Router::new()
        .route(
            "/api/send",
            post(routes::send::<C>).fallback(routes::not_found),
        )
        .route(
            "/api/bulk",
            post(routes::bulk::<C>).fallback(routes::not_found),
        )
        .fallback(routes::not_found)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn_with_state(requests, logging::log_requests))
}

/// Serve `app` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Server is ready");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
