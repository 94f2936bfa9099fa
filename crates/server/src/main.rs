//! # nf-smtp-web
//!
//! HTTP server entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use config_loader::AccountResolver;
use server::{AppState, ServerArgs};
use transport::SmtpConnector;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = ServerArgs::parse();
    observability::init_with_config(args.observability())
        .context("Failed to initialize observability")?;

    info!(version = env!("CARGO_PKG_VERSION"), "nf-smtp-web starting");

    let state = AppState::new(AccountResolver::from_env(), SmtpConnector);
    let app = server::router(state);

    let addr = args.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    server::serve(listener, app, server::shutdown_signal())
        .await
        .context("Server failed")?;

    info!("nf-smtp-web stopped");
    Ok(())
}
