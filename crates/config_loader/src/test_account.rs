//! Ephemeral test accounts
//!
//! Requests throwaway SMTP credentials from the Ethereal account service.
//! Messages sent with them are captured, never delivered.

use contracts::{Account, Credentials, MailError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Public Ethereal account endpoint
pub const DEFAULT_TEST_ACCOUNT_URL: &str = "https://api.nodemailer.com/user";

/// Environment variable overriding the endpoint
pub const TEST_ACCOUNT_URL_ENV: &str = "NF_SMTP_TEST_ACCOUNT_URL";

#[derive(Serialize)]
struct AccountRequest<'a> {
    requestor: &'a str,
    version: &'a str,
}

#[derive(Deserialize)]
struct AccountResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    pass: Option<String>,
    #[serde(default)]
    smtp: Option<SmtpEndpoint>,
}

#[derive(Deserialize)]
struct SmtpEndpoint {
    host: String,
    port: u16,
    secure: bool,
}

/// Client for the test account service
#[derive(Debug, Clone)]
pub struct TestAccountClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TestAccountClient {
    /// Client for a specific endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Client for `NF_SMTP_TEST_ACCOUNT_URL`, or the public service
    pub fn from_env() -> Self {
        let endpoint = std::env::var(TEST_ACCOUNT_URL_ENV)
            .unwrap_or_else(|_| DEFAULT_TEST_ACCOUNT_URL.to_string());
        Self::new(endpoint)
    }

    /// Request a fresh account
    ///
    /// # Errors
    /// `Connectivity` when the service is unreachable or refuses.
    #[instrument(name = "test_account_create", skip(self), fields(endpoint = %self.endpoint))]
    pub async fn create(&self) -> Result<Account, MailError> {
        let request = AccountRequest {
            requestor: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                MailError::connectivity("test account service unreachable").with_source(e)
            })?;

        let status = response.status();
        let body: AccountResponse = response.json().await.map_err(|e| {
            MailError::connectivity(format!("unexpected test account response (HTTP {status})"))
                .with_source(e)
        })?;
        debug!(status = %body.status, "Test account service replied");

        if body.status != "success" {
            return Err(MailError::connectivity(format!(
                "test account service refused: {}",
                body.error.unwrap_or(body.status)
            )));
        }

        let (Some(user), Some(pass), Some(smtp)) = (body.user, body.pass, body.smtp) else {
            return Err(MailError::connectivity(
                "test account response is missing credentials",
            ));
        };

        info!(host = %smtp.host, port = smtp.port, user = %user, "Test account created");

        let mut account = Account::new(smtp.host, smtp.port);
        account.secure = smtp.secure;
        account.auth = Some(Credentials::new(user, pass));
        Ok(account)
    }
}
