//! OutcomeSink trait - Result Reporter output interface

use crate::Outcome;

/// Destination for outcomes reported as soon as they settle
#[trait_variant::make(OutcomeSink: Send)]
pub trait LocalOutcomeSink {
    /// Sink name (used for logging)
    fn name(&self) -> &str;

    /// Write one outcome
    ///
    /// # Errors
    /// Returns the underlying write error
    async fn write(&mut self, outcome: &Outcome) -> std::io::Result<()>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> std::io::Result<()>;
}
