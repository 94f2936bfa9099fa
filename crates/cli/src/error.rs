//! Error types for CLI operations.

use contracts::MailError;
use dispatcher::DispatchError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Account, message, session or input failure
    #[error(transparent)]
    Mail(#[from] MailError),

    /// Outcome stream could not be written
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Result could not be written to stdout
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    /// Short classification for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mail(e) => e.kind(),
            Self::Dispatch(DispatchError::Mail(e)) => e.kind(),
            Self::Dispatch(DispatchError::Sink { .. }) => "SinkError",
            Self::Output(_) => "OutputError",
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
