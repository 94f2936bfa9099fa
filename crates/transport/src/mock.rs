//! Mock mail transport
//!
//! In-memory session for tests, with injectable failures and latency.
//! Behaviour is keyed by message subject.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contracts::{Account, Connector, Envelope, MailError, MailTransport, MessagePayload, SendInfo};
use tracing::instrument;

/// How verify should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyFailure {
    Authentication,
    Connectivity,
}

/// Mock transport configuration
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    /// Fail verify this way
    pub fail_verify: Option<VerifyFailure>,
    /// Subjects refused with a 550 reply
    pub reject_subjects: Vec<String>,
    /// Subjects whose send panics
    pub panic_subjects: Vec<String>,
    /// Per-subject send latency
    pub delays: HashMap<String, Duration>,
}

impl MockConfig {
    pub fn reject(mut self, subject: &str) -> Self {
        self.reject_subjects.push(subject.to_string());
        self
    }

    pub fn delay(mut self, subject: &str, delay: Duration) -> Self {
        self.delays.insert(subject.to_string(), delay);
        self
    }

    pub fn panic_on(mut self, subject: &str) -> Self {
        self.panic_subjects.push(subject.to_string());
        self
    }

    pub fn fail_verify(mut self, failure: VerifyFailure) -> Self {
        self.fail_verify = Some(failure);
        self
    }
}

/// Counters shared between a connector, its sessions and the test
#[derive(Debug, Default)]
pub struct MockStats {
    verify_calls: AtomicUsize,
    send_calls: AtomicUsize,
    close_calls: AtomicUsize,
    sends_after_close: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    closed: AtomicBool,
    accounts: Mutex<Vec<Account>>,
}

impl MockStats {
    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Sends started or finished after the session was closed
    pub fn sends_after_close(&self) -> usize {
        self.sends_after_close.load(Ordering::SeqCst)
    }

    /// Highest number of sends observed in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Accounts passed to `Connector::open`, in order
    pub fn opened_accounts(&self) -> Vec<Account> {
        self.accounts
            .lock()
            .map(|accounts| accounts.clone())
            .unwrap_or_default()
    }

    fn check_open(&self) {
        if self.closed.load(Ordering::SeqCst) {
            self.sends_after_close.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Mock session
pub struct MockTransport {
    config: MockConfig,
    stats: Arc<MockStats>,
}

impl MockTransport {
    pub fn new(config: MockConfig) -> Self {
        Self::with_stats(config, Arc::new(MockStats::default()))
    }

    pub fn with_stats(config: MockConfig, stats: Arc<MockStats>) -> Self {
        Self { config, stats }
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

impl MailTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    #[instrument(name = "mock_verify", skip(self))]
    async fn verify(&self) -> Result<(), MailError> {
        self.stats.verify_calls.fetch_add(1, Ordering::SeqCst);
        match self.config.fail_verify {
            Some(VerifyFailure::Authentication) => Err(MailError::authentication(
                "535 5.7.8 Authentication credentials invalid",
            )),
            Some(VerifyFailure::Connectivity) => {
                Err(MailError::connectivity("connection refused"))
            }
            None => Ok(()),
        }
    }

    #[instrument(name = "mock_send", skip(self, message), fields(subject = ?message.subject))]
    async fn send(&self, message: &MessagePayload) -> Result<SendInfo, MailError> {
        self.stats.check_open();
        let seq = self.stats.send_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        let subject = message.subject.clone().unwrap_or_default();
        if let Some(delay) = self.config.delays.get(&subject) {
            tokio::time::sleep(*delay).await;
        }

        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.stats.check_open();

        if self.config.panic_subjects.contains(&subject) {
            panic!("mock transport panicked on '{subject}'");
        }
        if self.config.reject_subjects.contains(&subject) {
            return Err(MailError::send(
                format!("permanent failure: 550 mailbox unavailable ({subject})"),
                Some(550),
            ));
        }

        let to: Vec<String> = message
            .to
            .iter()
            .flat_map(|a| a.entries())
            .map(str::to_string)
            .collect();
        Ok(SendInfo {
            message_id: Some(
                message
                    .message_id
                    .clone()
                    .unwrap_or_else(|| format!("<mock-{seq}@localhost>")),
            ),
            envelope: Envelope {
                from: message
                    .from
                    .as_ref()
                    .and_then(|a| a.entries().first().map(|s| s.to_string())),
                to: to.clone(),
            },
            accepted: to,
            rejected: Vec::new(),
            response: format!("250 2.0.0 Ok: queued as mock-{seq}"),
        })
    }

    async fn close(self) {
        self.stats.close_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.closed.store(true, Ordering::SeqCst);
    }
}

/// Connector handing out mock sessions that share one set of stats
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    config: MockConfig,
    stats: Arc<MockStats>,
}

impl MockConnector {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            stats: Arc::new(MockStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn open(&self, account: Account) -> Result<MockTransport, MailError> {
        if let Ok(mut accounts) = self.stats.accounts.lock() {
            accounts.push(account);
        }
        Ok(MockTransport::with_stats(
            self.config.clone(),
            Arc::clone(&self.stats),
        ))
    }
}
