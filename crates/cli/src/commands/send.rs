//! `send` command implementation.

use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

use config_loader::{AccountResolver, MessageLoader};
use contracts::{Connector, MailError, SendInfo};
use dispatcher::Batch;
use transport::SmtpConnector;

use super::account_source;
use crate::cli::SendArgs;
use crate::error::Result;

const MISSING_ACCOUNT: &str = "no SMTP account given: --account or --test is required";
const MISSING_MESSAGE: &str = "no message given: --message is required";

/// Execute the `send` command and print the send info as one JSON line
pub async fn run_send(args: &SendArgs) -> Result<()> {
    let info = perform_send(args, &AccountResolver::from_env(), &SmtpConnector).await?;

    let mut line = serde_json::to_vec(&info).map_err(std::io::Error::other)?;
    line.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&line).await?;
    stdout.flush().await?;
    Ok(())
}

/// Load, verify and send one message
///
/// Every missing input is reported at once, before any file or network
/// access.
#[instrument(name = "cli_send", skip_all)]
pub async fn perform_send<C: Connector>(
    args: &SendArgs,
    resolver: &AccountResolver,
    connector: &C,
) -> Result<SendInfo> {
    let source = account_source(&args.account);

    let mut problems = Vec::new();
    if source.is_none() {
        problems.push(MISSING_ACCOUNT);
    }
    if args.message.is_none() {
        problems.push(MISSING_MESSAGE);
    }
    let (Some(source), Some(message_path)) = (source, args.message.as_deref()) else {
        return Err(MailError::validation_all(problems).into());
    };

    info!(message = %message_path.display(), "Loading message");
    let message = MessageLoader::load_from_path(message_path)?;

    let account = resolver.resolve(Some(source), false).await?;
    let batch = Batch::open(connector.open(account).await?).await?;
    let info = batch.send_single(&message).await?;

    info!(message_id = ?info.message_id, response = %info.response, "Message sent");
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::AccountArgs;
    use crate::error::CliError;
    use config_loader::TestAccountClient;
    use std::io::Write;
    use std::path::PathBuf;
    use transport::{MockConfig, MockConnector, VerifyFailure};

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn resolver() -> AccountResolver {
        AccountResolver::new(TestAccountClient::new("http://127.0.0.1:9/user"))
    }

    fn args(account: Option<PathBuf>, message: Option<PathBuf>) -> SendArgs {
        SendArgs {
            account: AccountArgs {
                account,
                test: false,
            },
            message,
        }
    }

    #[tokio::test]
    async fn test_reports_every_missing_input() {
        let connector = MockConnector::default();
        let err = perform_send(&args(None, None), &resolver(), &connector)
            .await
            .unwrap_err();

        let CliError::Mail(MailError::Validation { message }) = &err else {
            panic!("expected validation error, got {err}");
        };
        assert!(message.contains("--account or --test"));
        assert!(message.contains("--message"));
        assert!(connector.stats().opened_accounts().is_empty());
    }

    #[tokio::test]
    async fn test_send_with_account_file() {
        let account = write_temp(r#"{ "host": "localhost", "port": 2525 }"#);
        let message = write_temp(
            r#"{ "from": "a@example.com", "to": "b@example.com", "subject": "hi", "text": "yo" }"#,
        );
        let connector = MockConnector::default();
        let stats = connector.stats();

        let info = perform_send(
            &args(Some(account.path().into()), Some(message.path().into())),
            &resolver(),
            &connector,
        )
        .await
        .unwrap();

        assert_eq!(info.accepted, vec!["b@example.com"]);
        assert_eq!(stats.send_calls(), 1);
        assert_eq!(stats.close_calls(), 1);
        assert!(!stats.opened_accounts()[0].pool);
    }

    #[tokio::test]
    async fn test_rejected_send_is_command_error() {
        let account = write_temp(r#"{ "host": "localhost" }"#);
        let message = write_temp(r#"{ "from": "a@example.com", "to": "b@example.com", "subject": "bad" }"#);
        let connector = MockConnector::new(MockConfig::default().reject("bad"));
        let stats = connector.stats();

        let err = perform_send(
            &args(Some(account.path().into()), Some(message.path().into())),
            &resolver(),
            &connector,
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "SendError");
        assert_eq!(stats.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_verify_failure_sends_nothing() {
        let account = write_temp(r#"{ "host": "localhost" }"#);
        let message = write_temp(r#"{ "to": "b@example.com" }"#);
        let connector =
            MockConnector::new(MockConfig::default().fail_verify(VerifyFailure::Connectivity));
        let stats = connector.stats();

        let err = perform_send(
            &args(Some(account.path().into()), Some(message.path().into())),
            &resolver(),
            &connector,
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "ConnectivityError");
        assert_eq!(stats.send_calls(), 0);
        assert_eq!(stats.close_calls(), 1);
    }
}
