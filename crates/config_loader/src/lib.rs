//! # Config Loader
//!
//! Account Resolver: turns a configuration source into SMTP `Account`
//! parameters, and loads message files for single sends.
//!
//! Responsibilities:
//! - Parse JSON/TOML account and message files
//! - Validate account legality
//! - Obtain ephemeral test accounts
//!
//! # Example
//!
//! ```no_run
//! use config_loader::AccountLoader;
//! use std::path::Path;
//!
//! let account = AccountLoader::load_from_path(Path::new("account.json")).unwrap();
//! println!("SMTP host: {}", account.host);
//! ```

mod parser;
mod test_account;
mod validator;

pub use parser::ConfigFormat;
pub use test_account::{TestAccountClient, DEFAULT_TEST_ACCOUNT_URL, TEST_ACCOUNT_URL_ENV};

use contracts::{Account, MailError, MessagePayload};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Where an account comes from
#[derive(Debug, Clone)]
pub enum AccountSource {
    /// Ephemeral test account, caller fields ignored
    Test,
    /// JSON or TOML file
    File(PathBuf),
    /// Already-decoded object (HTTP request body)
    Inline(Value),
}

impl AccountSource {
    /// Pick the source from front-end flags; test mode wins
    pub fn from_flags(test: bool, path: Option<PathBuf>) -> Option<Self> {
        if test {
            Some(Self::Test)
        } else {
            path.map(Self::File)
        }
    }
}

/// Account file loader
pub struct AccountLoader;

impl AccountLoader {
    /// Load an account from file path
    ///
    /// Format follows the extension (.json / .toml); anything else is JSON.
    ///
    /// # Errors
    /// `Configuration` on read, parse or validation failure.
    pub fn load_from_path(path: &Path) -> Result<Account, MailError> {
        let account: Account = load_file(path)?;
        validator::validate(&account)?;
        Ok(account)
    }

    /// Load an account from an already-decoded JSON value
    pub fn load_from_value(value: Value) -> Result<Account, MailError> {
        let account: Account = serde_json::from_value(value).map_err(|e| {
            MailError::configuration(format!("invalid account object: {e}")).with_source(e)
        })?;
        validator::validate(&account)?;
        Ok(account)
    }
}

/// Message file loader
pub struct MessageLoader;

impl MessageLoader {
    /// Load a message payload from file path
    pub fn load_from_path(path: &Path) -> Result<MessagePayload, MailError> {
        load_file(path)
    }
}

/// Resolves account sources, including remote test accounts
#[derive(Debug, Clone)]
pub struct AccountResolver {
    test_accounts: TestAccountClient,
}

impl AccountResolver {
    pub fn new(test_accounts: TestAccountClient) -> Self {
        Self { test_accounts }
    }

    /// Resolver using `NF_SMTP_TEST_ACCOUNT_URL` for test mode
    pub fn from_env() -> Self {
        Self::new(TestAccountClient::from_env())
    }

    /// Resolve a source into an account
    ///
    /// `pooled` forces pooling on regardless of what the source says.
    ///
    /// # Errors
    /// - `Validation` when no source is given (no network activity happens)
    /// - `Configuration` for unreadable or invalid sources
    /// - `Connectivity` when the test account service fails
    #[instrument(name = "account_resolve", skip(self, source))]
    pub async fn resolve(
        &self,
        source: Option<AccountSource>,
        pooled: bool,
    ) -> Result<Account, MailError> {
        let source = source.ok_or_else(|| {
            MailError::validation("account or test is required")
        })?;

        let account = match source {
            AccountSource::Test => self.test_accounts.create().await?,
            AccountSource::File(path) => AccountLoader::load_from_path(&path)?,
            AccountSource::Inline(value) => AccountLoader::load_from_value(value)?,
        };

        debug!(host = %account.host, port = account.effective_port(), "Account resolved");
        Ok(if pooled { account.pooled() } else { account })
    }
}

fn detect_format(path: &Path) -> ConfigFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ConfigFormat::from_extension)
        .unwrap_or(ConfigFormat::Json)
}

fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, MailError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MailError::configuration(format!("cannot read {}: {e}", path.display())).with_source(e)
    })?;
    parser::parse(&content, detect_format(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_json_account_file() {
        let file = write_temp(
            ".json",
            r#"{ "host": "smtp.example.com", "port": 2525, "auth": { "user": "u", "pass": "p" } }"#,
        );
        let account = AccountLoader::load_from_path(file.path()).unwrap();
        assert_eq!(account.host, "smtp.example.com");
        assert_eq!(account.effective_port(), 2525);
    }

    #[test]
    fn test_load_toml_account_file() {
        let file = write_temp(".toml", "host = \"mail.example.org\"\nsecure = true\n");
        let account = AccountLoader::load_from_path(file.path()).unwrap();
        assert!(account.secure);
        assert_eq!(account.effective_port(), 465);
    }

    #[test]
    fn test_unknown_extension_is_json() {
        let file = write_temp(".conf", r#"{ "host": "h" }"#);
        assert!(AccountLoader::load_from_path(file.path()).is_ok());
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = AccountLoader::load_from_path(Path::new("/nonexistent/account.json")).unwrap_err();
        assert!(matches!(err, MailError::Configuration { .. }));
        assert!(err.to_string().contains("account.json"));
    }

    #[test]
    fn test_invalid_inline_account() {
        let err = AccountLoader::load_from_value(serde_json::json!({ "host": "" })).unwrap_err();
        assert!(err.to_string().contains("host must not be empty"));
    }

    #[test]
    fn test_load_message_file() {
        let file = write_temp(
            ".json",
            r#"{ "from": "a@example.com", "to": "b@example.com", "subject": "hi", "text": "yo" }"#,
        );
        let message = MessageLoader::load_from_path(file.path()).unwrap();
        assert_eq!(message.subject.as_deref(), Some("hi"));
    }

    #[test]
    fn test_source_from_flags() {
        assert!(AccountSource::from_flags(false, None).is_none());
        assert!(matches!(
            AccountSource::from_flags(true, Some(PathBuf::from("a.json"))),
            Some(AccountSource::Test)
        ));
        assert!(matches!(
            AccountSource::from_flags(false, Some(PathBuf::from("a.json"))),
            Some(AccountSource::File(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_without_source_is_validation_error() {
        // Unroutable endpoint: the resolver must fail before touching it.
        let resolver = AccountResolver::new(TestAccountClient::new("http://127.0.0.1:9/user"));
        let err = resolver.resolve(None, true).await.unwrap_err();
        assert!(matches!(err, MailError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_resolve_forces_pool() {
        let resolver = AccountResolver::new(TestAccountClient::new("http://127.0.0.1:9/user"));
        let source = AccountSource::Inline(serde_json::json!({ "host": "h", "pool": false }));
        let account = resolver.resolve(Some(source), true).await.unwrap();
        assert!(account.pool);
    }
}
