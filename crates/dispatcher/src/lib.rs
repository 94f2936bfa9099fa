//! # Dispatcher
//!
//! Batch dispatch engine.
//!
//! Responsibilities:
//! - Admit raw input as work items
//! - Send them concurrently over one verified session
//! - Isolate per-item failures (including panics) as outcomes
//! - Close the session exactly once, after every send has settled

pub mod batch;
pub mod error;
pub mod metrics;
pub mod sinks;
pub mod source;

pub use batch::{Batch, BatchReport};
pub use contracts::{Outcome, OutcomeSink, WorkItem};
pub use error::DispatchError;
pub use metrics::{BatchMetrics, BatchSummary};
pub use sinks::JsonLinesSink;
pub use source::{admit_bytes, admit_line, admit_value, Admission};
