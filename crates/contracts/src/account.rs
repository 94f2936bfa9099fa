//! Account - Account Resolver output
//!
//! SMTP connection parameters. Field names follow the nodemailer SMTP
//! options so existing account files keep working.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default port for implicit TLS (SMTPS)
pub const SMTPS_PORT: u16 = 465;

/// Default port for submission with STARTTLS
pub const SUBMISSION_PORT: u16 = 587;

/// SMTP account connection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Server hostname
    #[serde(default = "default_host")]
    #[validate(length(min = 1, message = "host must not be empty"))]
    pub host: String,

    /// Server port (defaults depend on `secure`)
    #[serde(default)]
    #[validate(range(min = 1, message = "port must be > 0"))]
    pub port: Option<u16>,

    /// Implicit TLS from the first byte
    #[serde(default)]
    pub secure: bool,

    /// Login credentials
    #[serde(default)]
    #[validate(nested)]
    pub auth: Option<Credentials>,

    /// Fail if the server does not offer STARTTLS
    #[serde(default, rename = "requireTLS")]
    pub require_tls: bool,

    /// Never upgrade to TLS
    #[serde(default, rename = "ignoreTLS")]
    pub ignore_tls: bool,

    /// Client hostname announced in EHLO
    #[serde(default)]
    pub name: Option<String>,

    /// Keep connections open and reuse them across messages
    #[serde(default)]
    pub pool: bool,

    /// Upper bound of pooled connections
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1, message = "maxConnections must be >= 1"))]
    pub max_connections: u32,

    /// Connection timeout in milliseconds
    #[serde(default)]
    pub connection_timeout: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Transport security mode derived from the account flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// TLS wrapper (SMTPS)
    Implicit,
    /// STARTTLS mandatory
    Required,
    /// STARTTLS when offered
    Opportunistic,
    /// Plain text only
    Plain,
}

impl Account {
    /// Account pointing at `host:port` with default flags
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
            secure: false,
            auth: None,
            require_tls: false,
            ignore_tls: false,
            name: None,
            pool: false,
            max_connections: default_max_connections(),
            connection_timeout: None,
        }
    }

    /// Same account with pooling forced on
    pub fn pooled(mut self) -> Self {
        self.pool = true;
        self
    }

    /// Port to connect to
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(if self.secure {
            SMTPS_PORT
        } else {
            SUBMISSION_PORT
        })
    }

    /// Security mode
    pub fn security(&self) -> Security {
        if self.secure {
            Security::Implicit
        } else if self.ignore_tls {
            Security::Plain
        } else if self.require_tls {
            Security::Required
        } else {
            Security::Opportunistic
        }
    }

    /// Connection timeout, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.connection_timeout.map(Duration::from_millis)
    }
}

/// Login credentials
#[derive(Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "auth.user must not be empty"))]
    pub user: String,
    #[serde(default)]
    pub pass: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"***")
            .finish()
    }
}
