//! Dispatcher error types

use contracts::MailError;
use thiserror::Error;

/// Batch-fatal errors
///
/// Item-local failures never show up here; they become failed outcomes.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Session open/verify failure, input stream failure, or the single send
    #[error(transparent)]
    Mail(#[from] MailError),

    /// Outcome sink stopped accepting writes
    #[error("sink '{name}' write error: {source}")]
    Sink {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl DispatchError {
    /// Create a sink error
    pub fn sink(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Sink {
            name: name.into(),
            source,
        }
    }
}
