//! Batch - one verified session, many concurrent sends
//!
//! A `Batch` owns its transport from verify to close. Every admitted item
//! produces exactly one `Outcome`, and the session is closed exactly once
//! after all in-flight sends have settled, whatever happened to the input
//! or the sink in the meantime.

use std::io;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use contracts::{
    ErrorProjection, MailError, MailTransport, MessagePayload, Outcome, OutcomeSink, SendInfo,
    WorkItem,
};
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use futures::FutureExt;
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatchError;
use crate::metrics::{BatchMetrics, BatchSummary};
use crate::source::{admit_bytes, Admission};

/// Outcomes of an ordered batch, in input order
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub outcomes: Vec<Outcome>,
    pub summary: BatchSummary,
}

/// A verified session ready to send
pub struct Batch<T: MailTransport> {
    transport: T,
    metrics: BatchMetrics,
    started: Instant,
}

impl<T: MailTransport> Batch<T> {
    /// Verify the transport and take ownership of it
    ///
    /// On verify failure the transport is closed before the error is
    /// returned; no item is ever sent.
    #[instrument(name = "batch_open", skip(transport), fields(session = %transport.name()))]
    pub async fn open(transport: T) -> Result<Self, MailError> {
        if let Err(e) = transport.verify().await {
            warn!(error = %e, kind = e.kind(), "Session verify failed");
            transport.close().await;
            return Err(e);
        }
        debug!("Session verified");

        Ok(Self {
            transport,
            metrics: BatchMetrics::new(),
            started: Instant::now(),
        })
    }

    /// Send one message and close the session
    ///
    /// A send failure is returned as the operation's error.
    #[instrument(name = "batch_send_single", skip(self, message))]
    pub async fn send_single(self, message: &MessagePayload) -> Result<SendInfo, MailError> {
        self.metrics.inc_admitted();
        self.metrics.send_started();
        let result = self.transport.send(message).await;
        self.metrics.send_finished();

        let outcome = match &result {
            Ok(info) => Outcome::success(serde_json::Value::Null, info.clone()),
            Err(e) => Outcome::failure(serde_json::Value::Null, e),
        };
        self.metrics.record(&outcome);

        self.finish("single").await;
        result
    }

    /// Send every admitted item concurrently; outcomes keep input order
    #[instrument(name = "batch_run_ordered", skip(self, admissions), fields(items = admissions.len()))]
    pub async fn run_ordered(self, admissions: Vec<Admission>) -> BatchReport {
        let sends: Vec<_> = admissions
            .into_iter()
            .map(|admission| self.process(admission))
            .collect();
        let outcomes = futures::future::join_all(sends).await;

        let summary = self.finish("ordered").await;
        BatchReport { outcomes, summary }
    }

    /// Read items line by line, send each as soon as it is admitted and
    /// write outcomes to `sink` in completion order
    ///
    /// Every line yields one outcome. Blank, non-UTF-8 or non-JSON lines
    /// fail with a `null` id and the stream keeps going.
    ///
    /// # Errors
    /// - `Mail(Input)` when reading the input fails
    /// - `Sink` when the sink stops accepting outcomes
    ///
    /// In both cases every send already started is awaited and the session
    /// is closed before returning.
    #[instrument(name = "batch_run_streaming", skip_all, fields(sink = %sink.name()))]
    pub async fn run_streaming<S, L, K>(
        self,
        mut input: S,
        sink: &mut K,
    ) -> Result<BatchSummary, DispatchError>
    where
        S: Stream<Item = io::Result<L>> + Unpin,
        L: AsRef<[u8]>,
        K: OutcomeSink,
    {
        let mut in_flight = FuturesUnordered::new();
        let mut input_open = true;
        let mut input_error: Option<io::Error> = None;
        let mut sink_error: Option<io::Error> = None;

        loop {
            tokio::select! {
                line = input.next(), if input_open => match line {
                    Some(Ok(line)) => in_flight.push(self.process(admit_bytes(line.as_ref()))),
                    Some(Err(e)) => {
                        error!(error = %e, "Input stream failed, draining in-flight sends");
                        input_error = Some(e);
                        input_open = false;
                    }
                    None => {
                        debug!(in_flight = in_flight.len(), "Input exhausted");
                        input_open = false;
                    }
                },
                Some(outcome) = in_flight.next(), if !in_flight.is_empty() => {
                    if sink_error.is_none() {
                        if let Err(e) = sink.write(&outcome).await {
                            error!(sink = %sink.name(), error = %e, "Sink write failed");
                            sink_error = Some(e);
                        }
                    }
                }
                else => break,
            }
        }
        drop(in_flight);

        if sink_error.is_none() {
            if let Err(e) = sink.flush().await {
                sink_error = Some(e);
            }
        }

        let summary = self.finish("streaming").await;

        if let Some(e) = input_error {
            return Err(MailError::Input(e).into());
        }
        if let Some(e) = sink_error {
            return Err(DispatchError::sink(sink.name(), e));
        }
        Ok(summary)
    }

    async fn process(&self, admission: Admission) -> Outcome {
        self.metrics.inc_admitted();
        let outcome = match admission {
            Ok(item) => {
                self.metrics.send_started();
                let outcome = send_isolated(&self.transport, item).await;
                self.metrics.send_finished();
                outcome
            }
            Err(rejected) => rejected,
        };
        self.metrics.record(&outcome);
        outcome
    }

    /// Close the session and report
    async fn finish(self, mode: &'static str) -> BatchSummary {
        let Self {
            transport,
            metrics,
            started,
        } = self;
        transport.close().await;

        let summary = metrics.summary(started.elapsed());
        observability::metrics::record_batch(mode, summary.admitted, summary.failed, summary.elapsed);
        info!(
            mode,
            admitted = summary.admitted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            peak_in_flight = summary.peak_in_flight,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Batch finished, session closed"
        );
        summary
    }
}

/// Send one item; failures and panics become a failed outcome
async fn send_isolated<T: MailTransport>(transport: &T, item: WorkItem) -> Outcome {
    let WorkItem { id, message } = item;
    match AssertUnwindSafe(transport.send(&message)).catch_unwind().await {
        Ok(Ok(info)) => Outcome::success(id, info),
        Ok(Err(e)) => {
            debug!(id = %id, kind = e.kind(), error = %e, "Send failed");
            Outcome::failure(id, e)
        }
        Err(panic) => {
            error!(id = %id, "Send panicked");
            Outcome::failure(id, ErrorProjection::from_panic(panic))
        }
    }
}
