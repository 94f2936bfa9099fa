//! Server arguments using clap.

use clap::Parser;
use observability::{LogFormat, ObservabilityConfig};
use std::net::{IpAddr, SocketAddr};

/// nf-smtp-web - HTTP front end for nf-smtp
#[derive(Parser, Debug, Clone)]
#[command(
    name = "nf-smtp-web",
    author,
    version,
    about = "Serve POST /api/send and POST /api/bulk"
)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0", env = "NF_SMTP_WEB_HOST")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, default_value_t = 8080, env = "NF_SMTP_WEB_PORT")]
    pub port: u16,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value_t = 0, env = "NF_SMTP_WEB_METRICS_PORT")]
    pub metrics_port: u16,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logs except warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format: json, pretty or compact
    #[arg(long, default_value = "pretty", env = "NF_SMTP_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl ServerArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn observability(&self) -> ObservabilityConfig {
        ObservabilityConfig::from_verbosity(self.verbose, self.quiet)
            .with_log_format(self.log_format)
            .with_metrics_port(self.metrics_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition_is_consistent() {
        ServerArgs::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = ServerArgs::try_parse_from(["nf-smtp-web"]).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.addr().to_string(), "0.0.0.0:8080");
        assert_eq!(args.observability().metrics_port, None);
    }

    #[test]
    fn test_overrides() {
        let args = ServerArgs::try_parse_from([
            "nf-smtp-web", "--host", "127.0.0.1", "--port", "3000", "--metrics-port", "9100",
            "--log-format", "json",
        ])
        .unwrap();
        assert_eq!(args.addr().to_string(), "127.0.0.1:3000");
        let config = args.observability();
        assert_eq!(config.metrics_port, Some(9100));
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
