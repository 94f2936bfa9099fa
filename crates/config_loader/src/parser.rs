//! Source file parsing
//!
//! JSON is the native format (nodemailer-compatible files); TOML is accepted
//! for hand-written account files.

use contracts::MailError;
use serde::de::DeserializeOwned;

/// Source file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON (default)
    Json,
    /// TOML
    Toml,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Parse JSON content
pub fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, MailError> {
    serde_json::from_str(content)
        .map_err(|e| MailError::configuration(format!("JSON parse error: {e}")).with_source(e))
}

/// Parse TOML content
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, MailError> {
    toml::from_str(content)
        .map_err(|e| MailError::configuration(format!("TOML parse error: {e}")).with_source(e))
}

/// Parse content according to format
pub fn parse<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> Result<T, MailError> {
    match format {
        ConfigFormat::Json => parse_json(content),
        ConfigFormat::Toml => parse_toml(content),
    }
}
