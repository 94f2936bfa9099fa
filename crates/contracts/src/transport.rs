//! MailTransport / Connector traits - Transport Session interface
//!
//! The dispatch engine only talks to these traits, so the lettre-backed
//! session and the in-memory mock are interchangeable.

use std::future::Future;

use crate::{Account, MailError, MessagePayload, SendInfo};

/// A connected, shareable mail session
///
/// All sends of one batch go through `&self` concurrently.
pub trait MailTransport: Send + Sync {
    /// Transport name (used for logging)
    fn name(&self) -> &str;

    /// Liveness and authentication check, run once before any send
    ///
    /// # Errors
    /// `Authentication` when the server refuses the credentials,
    /// `Connectivity` for everything else.
    fn verify(&self) -> impl Future<Output = Result<(), MailError>> + Send;

    /// Send one message over the shared session
    ///
    /// # Errors
    /// Item-local `Message` / `Send` errors.
    fn send(
        &self,
        message: &MessagePayload,
    ) -> impl Future<Output = Result<SendInfo, MailError>> + Send;

    /// Release pooled resources
    ///
    /// Consumes the session so it can only happen once.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Opens sessions for resolved accounts
pub trait Connector: Send + Sync {
    type Transport: MailTransport;

    /// Build the session; connecting may be deferred until `verify`
    fn open(
        &self,
        account: Account,
    ) -> impl Future<Output = Result<Self::Transport, MailError>> + Send;
}
