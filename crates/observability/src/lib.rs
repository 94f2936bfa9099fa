//! # Observability
//!
//! Tracing and Prometheus metrics for the `nf-smtp` front ends.
//!
//! Logs always go to stderr: the CLI's stdout carries the outcome protocol.
//!
//! ```ignore
//! let config = observability::ObservabilityConfig::from_verbosity(1, false);
//! observability::init_with_config(config)?;
//! observability::metrics::record_send_outcome(true);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_format: LogFormat,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
    /// Level used when `RUST_LOG` is unset
    pub default_log_level: String,
    /// Whether `RUST_LOG` may override the default level
    pub respect_env: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            metrics_port: None,
            default_log_level: "info".to_string(),
            respect_env: true,
        }
    }
}

impl ObservabilityConfig {
    /// Level from `-v` count and `--quiet`
    ///
    /// Quiet pins the level to `warn`, ignoring `RUST_LOG`.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let default_log_level = if quiet {
            "warn"
        } else {
            match verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        };
        Self {
            default_log_level: default_log_level.to_string(),
            respect_env: !quiet,
            ..Self::default()
        }
    }

    pub fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    /// Enable the Prometheus endpoint; port 0 leaves it disabled
    pub fn with_metrics_port(mut self, port: u16) -> Self {
        self.metrics_port = (port != 0).then_some(port);
        self
    }

    fn filter(&self) -> EnvFilter {
        if self.respect_env {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&self.default_log_level))
        } else {
            EnvFilter::new(&self.default_log_level)
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}' (json, pretty, compact)")),
        }
    }
}

/// Initialize tracing and, if configured, the Prometheus exporter
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    if let Some(port) = config.metrics_port {
        init_metrics_only(port)?;
    }

    tracing::debug!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// Initialize Prometheus metrics only (tracing set up elsewhere)
pub fn init_metrics_only(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
