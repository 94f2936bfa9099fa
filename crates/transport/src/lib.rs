//! # Transport
//!
//! Transport Session implementations.
//!
//! Responsibilities:
//! - Build pooled lettre SMTP sessions from an `Account`
//! - Map message payloads onto lettre's MIME builder
//! - Classify SMTP failures into the `MailError` taxonomy
//! - Provide an in-memory mock session for tests

pub mod message;
pub mod mock;
pub mod smtp;

pub use contracts::{Connector, MailTransport};
pub use message::build_message;
pub use mock::{MockConfig, MockConnector, MockStats, MockTransport, VerifyFailure};
pub use smtp::{SmtpConnector, SmtpSession};
