//! Batch metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use contracts::Outcome;

/// Live counters for a single batch
#[derive(Debug, Default)]
pub struct BatchMetrics {
    /// Items admitted, including undecodable ones
    admitted: AtomicU64,
    /// Outcomes with `success: true`
    succeeded: AtomicU64,
    /// Outcomes with `success: false`
    failed: AtomicU64,
    /// Sends currently awaiting the transport
    in_flight: AtomicUsize,
    /// Highest concurrent send count seen
    peak_in_flight: AtomicUsize,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    pub fn inc_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }

    pub fn send_started(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::Relaxed);
    }

    pub fn send_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Count a finished outcome and forward it to the metrics recorder
    pub fn record(&self, outcome: &Outcome) {
        if outcome.is_success() {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        observability::metrics::record_send_outcome(outcome.is_success());
    }

    /// Get summary of the batch so far
    pub fn summary(&self, elapsed: Duration) -> BatchSummary {
        BatchSummary {
            admitted: self.admitted(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            peak_in_flight: self.peak_in_flight(),
            elapsed,
        }
    }
}

/// Final counts of a batch (for reporting)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    pub admitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub peak_in_flight: usize,
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Outcomes produced so far
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Failure ratio in [0, 1]; 0 for an empty batch
    pub fn failure_rate(&self) -> f64 {
        match self.completed() {
            0 => 0.0,
            n => self.failed as f64 / n as f64,
        }
    }
}
