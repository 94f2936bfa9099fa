//! Layered error definitions
//!
//! Categorized by where the failure stops: request-fatal (validation / config /
//! auth / connectivity / input) or item-local (message / send).

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type
#[derive(Debug, Error)]
pub enum MailError {
    // ===== Request Errors =====
    /// Bad or missing arguments, malformed request body
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Account or message source unreadable, malformed or invalid
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // ===== Session Errors =====
    /// Server rejected the credentials during verify
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Server unreachable, TLS failure or unexpected greeting
    #[error("connection failed: {message}")]
    Connectivity {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // ===== Item Errors =====
    /// Payload could not be turned into a MIME message
    #[error("invalid message: {message}")]
    Message {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Transport failed or the server refused the message
    #[error("send failed: {message}")]
    Send {
        message: String,
        code: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    // ===== Input Errors =====
    /// Reading the work-item stream failed
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),
}

impl MailError {
    /// Create validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create validation error listing every problem, one per line
    pub fn validation_all<I, S>(problems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = problems
            .into_iter()
            .map(|p| format!("- {}", p.as_ref()))
            .collect();
        Self::validation(format!("\n{}", lines.join("\n")))
    }

    /// Create configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            source: None,
        }
    }

    /// Create connectivity error
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity {
            message: message.into(),
            source: None,
        }
    }

    /// Create message construction error
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
            source: None,
        }
    }

    /// Create send error
    pub fn send(message: impl Into<String>, code: Option<u16>) -> Self {
        Self::Send {
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach an underlying cause
    pub fn with_source(mut self, err: impl Into<BoxError>) -> Self {
        match &mut self {
            Self::Configuration { source, .. }
            | Self::Authentication { source, .. }
            | Self::Connectivity { source, .. }
            | Self::Message { source, .. }
            | Self::Send { source, .. } => *source = Some(err.into()),
            Self::Validation { .. } | Self::Input(_) => {}
        }
        self
    }

    /// Classification name, used as `err.name` in outcomes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::Configuration { .. } => "ConfigurationError",
            Self::Authentication { .. } => "AuthenticationError",
            Self::Connectivity { .. } => "ConnectivityError",
            Self::Message { .. } => "MessageError",
            Self::Send { .. } => "SendError",
            Self::Input(_) => "InputError",
        }
    }

    /// SMTP reply code, when the server produced one
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Send { code, .. } => *code,
            _ => None,
        }
    }
}
