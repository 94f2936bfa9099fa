//! `bulk` command implementation.

use std::io;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::SplitStream;
use tokio_stream::Stream;
use tracing::{info, instrument};

use config_loader::AccountResolver;
use contracts::{Connector, OutcomeSink};
use dispatcher::{Batch, BatchSummary, JsonLinesSink};
use transport::SmtpConnector;

use super::account_source;
use crate::cli::BulkArgs;
use crate::error::Result;

/// Execute the `bulk` command: stdin lines in, outcome lines out
pub async fn run_bulk(args: &BulkArgs) -> Result<()> {
    let input = SplitStream::new(BufReader::new(tokio::io::stdin()).split(b'\n'));
    let mut sink = JsonLinesSink::stdout();

    let summary = perform_bulk(
        args,
        &AccountResolver::from_env(),
        &SmtpConnector,
        input,
        &mut sink,
    )
    .await?;

    info!(
        sent = summary.succeeded,
        failed = summary.failed,
        failure_rate = summary.failure_rate(),
        duration_ms = summary.elapsed.as_millis() as u64,
        "Bulk send completed"
    );
    Ok(())
}

/// Resolve a pooled account, verify it, then stream `input` through one batch
#[instrument(name = "cli_bulk", skip_all)]
pub async fn perform_bulk<C, S, L, K>(
    args: &BulkArgs,
    resolver: &AccountResolver,
    connector: &C,
    input: S,
    sink: &mut K,
) -> Result<BatchSummary>
where
    C: Connector,
    S: Stream<Item = io::Result<L>> + Unpin,
    L: AsRef<[u8]>,
    K: OutcomeSink,
{
    let account = resolver.resolve(account_source(&args.account), true).await?;
    let batch = Batch::open(connector.open(account).await?).await?;
    Ok(batch.run_streaming(input, sink).await?)
}
