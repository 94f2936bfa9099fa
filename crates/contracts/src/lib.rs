//! # Contracts
//!
//! Interface contracts shared by every crate of the workspace: the data
//! model (account, message, work item, outcome), the error taxonomy and the
//! transport / sink traits. Business crates depend on this crate only.

mod account;
mod error;
mod message;
mod outcome;
mod sink;
mod transport;

pub use account::*;
pub use error::*;
pub use message::*;
pub use outcome::*;
pub use sink::{LocalOutcomeSink, OutcomeSink};
pub use transport::{Connector, MailTransport};

/// Re-exported so callers can name opaque ids without a direct dependency
pub use serde_json::Value as JsonValue;
