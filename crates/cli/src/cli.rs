//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nf-smtp - send mail through one pooled SMTP session
#[derive(Parser, Debug)]
#[command(
    name = "nf-smtp",
    author,
    version,
    about = "Send one message, or many from stdin, over a single SMTP session",
    long_about = "Send email through an SMTP account.\n\n\
                  `send` delivers one message file. `bulk` reads one { id, message } JSON\n\
                  object per stdin line and prints one outcome per line as each send\n\
                  completes. Failed sends are reported, not fatal: the exit code is\n\
                  non-zero only for argument, account, authentication or connection errors."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all logs except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (logs go to stderr)
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "NF_SMTP_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one message
    Send(SendArgs),

    /// Send many messages read from stdin, one JSON object per line
    Bulk(BulkArgs),

    /// Print the version
    Version,
}

/// Where the SMTP account comes from
#[derive(Args, Debug, Clone, Default)]
pub struct AccountArgs {
    /// SMTP account file (JSON or TOML)
    #[arg(long, value_name = "PATH")]
    pub account: Option<PathBuf>,

    /// Use a throwaway test account (--account is ignored)
    #[arg(long)]
    pub test: bool,
}

/// Arguments for the `send` command
#[derive(Args, Debug, Clone, Default)]
pub struct SendArgs {
    #[command(flatten)]
    pub account: AccountArgs,

    /// Message file (JSON or TOML)
    #[arg(long, value_name = "PATH")]
    pub message: Option<PathBuf>,
}

/// Arguments for the `bulk` command
#[derive(Args, Debug, Clone, Default)]
pub struct BulkArgs {
    #[command(flatten)]
    pub account: AccountArgs,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
