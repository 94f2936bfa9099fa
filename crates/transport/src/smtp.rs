//! lettre-backed SMTP session
//!
//! One `AsyncSmtpTransport` per session; lettre owns the connection pool,
//! TLS negotiation and the protocol itself.

use contracts::{Account, Connector, Envelope, MailError, MailTransport, MessagePayload, SendInfo, Security};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::transport::smtp::response::Response;
use lettre::transport::smtp::{Error as SmtpError, PoolConfig};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, info, instrument};

use crate::message::{build_message, message_id};

/// SMTP reply codes that mean the credentials were refused
const AUTH_FAILURE_CODES: [u16; 4] = [530, 534, 535, 538];

/// Pooled SMTP session for one account
pub struct SmtpSession {
    name: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpSession {
    /// Build the lettre transport; no connection is made yet
    ///
    /// # Errors
    /// `Connectivity` when TLS parameters cannot be built for the host.
    pub fn from_account(account: &Account) -> Result<Self, MailError> {
        let port = account.effective_port();
        let tls = tls_for(account)?;

        let max_size = if account.pool {
            account.max_connections
        } else {
            1
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(account.host.clone())
            .port(port)
            .tls(tls)
            .timeout(account.timeout())
            .pool_config(PoolConfig::new().max_size(max_size));

        if let Some(auth) = &account.auth {
            builder = builder.credentials(Credentials::new(auth.user.clone(), auth.pass.clone()));
        }
        if let Some(name) = &account.name {
            builder = builder.hello_name(ClientId::Domain(name.clone()));
        }

        debug!(
            host = %account.host,
            port,
            security = ?account.security(),
            pool_size = max_size,
            "SMTP transport built"
        );

        Ok(Self {
            name: format!("smtp://{}:{}", account.host, port),
            mailer: builder.build(),
        })
    }
}

fn tls_for(account: &Account) -> Result<Tls, MailError> {
    let params = || {
        TlsParameters::new(account.host.clone()).map_err(|e| {
            MailError::connectivity(format!("cannot set up TLS for {}", account.host)).with_source(e)
        })
    };
    Ok(match account.security() {
        Security::Implicit => Tls::Wrapper(params()?),
        Security::Required => Tls::Required(params()?),
        Security::Opportunistic => Tls::Opportunistic(params()?),
        Security::Plain => Tls::None,
    })
}

impl MailTransport for SmtpSession {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "smtp_verify", skip(self), fields(transport = %self.name))]
    async fn verify(&self) -> Result<(), MailError> {
        match self.mailer.test_connection().await {
            Ok(true) => {
                info!(transport = %self.name, "SMTP session verified");
                Ok(())
            }
            Ok(false) => Err(MailError::connectivity(format!(
                "{} did not answer the liveness check",
                self.name
            ))),
            Err(e) => Err(classify_verify_error(e)),
        }
    }

    #[instrument(name = "smtp_send", skip(self, message), fields(transport = %self.name))]
    async fn send(&self, message: &MessagePayload) -> Result<SendInfo, MailError> {
        let email = build_message(message)?;
        let message_id = message_id(&email);
        let envelope = email.envelope().clone();

        let response = self
            .mailer
            .send(email)
            .await
            .map_err(send_error)?;

        let to: Vec<String> = envelope.to().iter().map(|a| a.to_string()).collect();
        debug!(message_id = ?message_id, recipients = to.len(), "Message accepted");

        Ok(SendInfo {
            message_id,
            envelope: Envelope {
                from: envelope.from().map(|a| a.to_string()),
                to: to.clone(),
            },
            // lettre aborts the transaction on the first refused recipient
            accepted: to,
            rejected: Vec::new(),
            response: render_response(&response),
        })
    }

    async fn close(self) {
        self.mailer.shutdown().await;
        drop(self.mailer);
        debug!(transport = %self.name, "SMTP session closed");
    }
}

fn render_response(response: &Response) -> String {
    let text: Vec<&str> = response.message().collect();
    format!("{} {}", response.code(), text.join(" "))
}

fn reply_code(err: &SmtpError) -> Option<u16> {
    err.status().map(u16::from)
}

fn classify_verify_error(err: SmtpError) -> MailError {
    let code = reply_code(&err);
    let refused_auth = code.is_some_and(|c| AUTH_FAILURE_CODES.contains(&c))
        || (err.is_client() && err.to_string().to_lowercase().contains("authentication"));

    if refused_auth {
        MailError::authentication(err.to_string()).with_source(err)
    } else {
        MailError::connectivity(err.to_string()).with_source(err)
    }
}

fn send_error(err: SmtpError) -> MailError {
    let code = reply_code(&err);
    let kind = if err.is_permanent() {
        "permanent"
    } else if err.is_transient() {
        "transient"
    } else if err.is_timeout() {
        "timeout"
    } else {
        "transport"
    };
    MailError::send(format!("{kind} failure: {err}"), code).with_source(err)
}

/// Opens lettre sessions
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpConnector;

impl Connector for SmtpConnector {
    type Transport = SmtpSession;

    async fn open(&self, account: Account) -> Result<SmtpSession, MailError> {
        SmtpSession::from_account(&account)
    }
}
