//! # nf-smtp CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - `send`: one message file over one verified session
//! - `bulk`: stdin work items in, one outcome line per send out
//! - `version`

mod cli;
mod commands;
mod error;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use cli::{Cli, Commands};
use commands::{print_version, run_bulk, run_send};
use observability::ObservabilityConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = ObservabilityConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_log_format(cli.log_format.into());
    observability::init_with_config(config).context("Failed to initialize logging")?;

    debug!(version = env!("CARGO_PKG_VERSION"), "nf-smtp starting");

    let result = match &cli.command {
        Commands::Send(args) => run_send(args).await,
        Commands::Bulk(args) => run_bulk(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, kind = e.kind(), "Command failed");
    }

    result.context("nf-smtp failed")
}
