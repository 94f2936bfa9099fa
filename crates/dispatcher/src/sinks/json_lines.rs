//! JsonLinesSink - one JSON object per line

use contracts::{Outcome, OutcomeSink};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument};

/// Sink writing each outcome as a single JSON line
///
/// Every line is flushed on write so a consumer sees outcomes as they
/// complete.
pub struct JsonLinesSink<W> {
    name: String,
    writer: W,
    lines: u64,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    /// Create a new JsonLinesSink over any async writer
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer,
            lines: 0,
        }
    }

    /// Number of outcomes written
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<tokio::io::Stdout> {
    /// Sink on the process standard output
    pub fn stdout() -> Self {
        Self::new("stdout", tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> OutcomeSink for JsonLinesSink<W> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "json_lines_sink_write",
        skip(self, outcome),
        fields(sink = %self.name, success = outcome.is_success())
    )]
    async fn write(&mut self, outcome: &Outcome) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(outcome).map_err(std::io::Error::other)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.writer.flush().await?;
        self.lines += 1;
        Ok(())
    }

    #[instrument(name = "json_lines_sink_flush", skip(self))]
    async fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush().await?;
        debug!(sink = %self.name, lines = self.lines, "JsonLinesSink flushed");
        Ok(())
    }
}
