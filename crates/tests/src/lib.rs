//! # Integration Tests
//!
//! End-to-end tests across crates.
//!
//! Covers:
//! - Contract snapshots of the wire format
//! - Account resolution -> session -> batch -> sink, on the mock transport
//! - The HTTP API on a live loopback server

#[cfg(test)]
mod contract_tests {
    use contracts::{ErrorProjection, MailError, Outcome, SendInfo};
    use serde_json::json;

    #[test]
    fn test_outcome_wire_format() {
        let ok = Outcome::success(json!(1), SendInfo::default());
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["id"], json!(1));
        assert_eq!(value["success"], json!(true));
        assert!(value.get("info").is_some());
        assert!(value.get("err").is_none());

        let failed = Outcome::failure(json!("x"), MailError::send("550 mailbox unavailable", Some(550)));
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["err"]["name"], json!("SendError"));
        assert_eq!(value["err"]["code"], json!(550));
        assert!(value.get("info").is_none());
    }

    #[test]
    fn test_opaque_panic_projection() {
        let projection = ErrorProjection::from_panic(Box::new(42_u32));
        assert_eq!(serde_json::to_value(projection).unwrap(), json!("opaque failure"));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::io::Write;
    use std::time::Duration;

    use config_loader::{AccountResolver, AccountSource, TestAccountClient};
    use contracts::Connector;
    use dispatcher::{Batch, JsonLinesSink};
    use serde_json::{json, Value};
    use transport::{MockConfig, MockConnector};

    fn line(id: usize, subject: &str) -> String {
        json!({
            "id": id,
            "message": { "from": "a@example.com", "to": "b@example.com", "subject": subject, "text": "x" }
        })
        .to_string()
    }

    /// account file -> resolver -> mock session -> streaming batch -> JSON lines
    #[tokio::test]
    async fn test_e2e_streaming_bulk() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(b"host = \"localhost\"\nport = 2525\nmaxConnections = 3\n")
            .unwrap();

        let resolver = AccountResolver::new(TestAccountClient::new("http://127.0.0.1:9/user"));
        let account = resolver
            .resolve(Some(AccountSource::File(file.path().into())), true)
            .await
            .unwrap();
        assert!(account.pool);
        assert_eq!(account.max_connections, 3);

        let mut config = MockConfig::default().reject("subject-7");
        for i in (0..20).step_by(3) {
            config = config.delay(&format!("subject-{i}"), Duration::from_millis(30));
        }
        let connector = MockConnector::new(config);
        let stats = connector.stats();

        let lines: Vec<std::io::Result<String>> =
            (0..20).map(|i| Ok(line(i, &format!("subject-{i}")))).collect();
        let mut sink = JsonLinesSink::new("e2e", Vec::new());

        let batch = Batch::open(connector.open(account).await.unwrap()).await.unwrap();
        let summary = batch
            .run_streaming(futures::stream::iter(lines), &mut sink)
            .await
            .unwrap();

        assert_eq!(summary.admitted, 20);
        assert_eq!(summary.failed, 1);
        assert_eq!(stats.close_calls(), 1);
        assert_eq!(stats.sends_after_close(), 0);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let outcomes: Vec<Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let ids: HashSet<u64> = outcomes.iter().filter_map(|o| o["id"].as_u64()).collect();
        assert_eq!(ids, (0..20).collect());
        let failed: Vec<&Value> = outcomes.iter().filter(|o| o["success"] == json!(false)).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0]["id"], json!(7));
    }
}

#[cfg(test)]
mod http_tests {
    use std::time::Duration;

    use axum::routing::post;
    use axum::{Json, Router};
    use config_loader::{AccountResolver, TestAccountClient};
    use contracts::Connector;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use server::AppState;
    use tokio::net::TcpListener;
    use transport::{MockConfig, MockConnector, VerifyFailure};

    async fn spawn_app<C: Connector + 'static>(state: AppState<C>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(server::serve(
            listener,
            server::router(state),
            std::future::pending(),
        ));
        format!("http://{addr}")
    }

    /// Stand-in for the test account service
    async fn spawn_account_service() -> String {
        let app = Router::new().route(
            "/user",
            post(|Json(request): Json<Value>| async move {
                assert!(request["requestor"].is_string());
                Json(json!({
                    "status": "success",
                    "user": "throwaway@ethereal.test",
                    "pass": "secret",
                    "smtp": { "host": "smtp.ethereal.test", "port": 587, "secure": false }
                }))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });
        format!("http://{addr}/user")
    }

    fn state(connector: MockConnector) -> AppState<MockConnector> {
        AppState::new(
            AccountResolver::new(TestAccountClient::new("http://127.0.0.1:9/user")),
            connector,
        )
    }

    fn item(id: Value, subject: &str) -> Value {
        json!({
            "id": id,
            "message": { "from": "a@example.com", "to": "b@example.com", "subject": subject, "text": "x" }
        })
    }

    #[tokio::test]
    async fn test_bulk_outputs_follow_input_order() {
        let config = MockConfig::default()
            .delay("first", Duration::from_millis(150))
            .delay("second", Duration::from_millis(50))
            .reject("second");
        let connector = MockConnector::new(config);
        let stats = connector.stats();
        let base = spawn_app(state(connector)).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/api/bulk"))
            .json(&json!({
                "account": { "host": "localhost", "port": 2525 },
                "messages": [item(json!(1), "first"), item(json!(2), "second"), item(json!("three"), "third")]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await.unwrap();
        let outputs = body["outputs"].as_array().unwrap();
        let ids: Vec<&Value> = outputs.iter().map(|o| &o["id"]).collect();
        assert_eq!(ids, vec![&json!(1), &json!(2), &json!("three")]);
        assert_eq!(outputs[0]["success"], json!(true));
        assert_eq!(outputs[1]["success"], json!(false));
        assert_eq!(outputs[1]["err"]["code"], json!(550));
        assert!(outputs[2]["info"]["messageId"].is_string());

        assert!(stats.opened_accounts()[0].pool);
        assert_eq!(stats.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_bulk_malformed_element_keeps_id() {
        let base = spawn_app(state(MockConnector::default())).await;

        let body: Value = reqwest::Client::new()
            .post(format!("{base}/api/bulk"))
            .json(&json!({
                "test": false,
                "account": { "host": "localhost" },
                "messages": [{ "id": 9, "message": "not an object" }, item(json!(10), "ok")]
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["outputs"][0]["id"], json!(9));
        assert_eq!(body["outputs"][0]["success"], json!(false));
        assert_eq!(body["outputs"][1]["success"], json!(true));
    }

    #[tokio::test]
    async fn test_bad_bodies_are_400_before_any_session() {
        let connector = MockConnector::default();
        let stats = connector.stats();
        let base = spawn_app(state(connector)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/api/bulk"))
            .body(r#"{"messages":[],"test":true}"#)
            .header("content-type", "text/plain")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text().await.unwrap(), "messages is required");

        let response = client
            .post(format!("{base}/api/bulk"))
            .body("{not json")
            .header("content-type", "application/json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = client
            .post(format!("{base}/api/send"))
            .json(&json!({ "message": { "to": "b@example.com" } }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.text().await.unwrap(), "account or test is required");

        assert_eq!(stats.verify_calls(), 0);
    }

    #[tokio::test]
    async fn test_verify_failure_is_500() {
        let connector =
            MockConnector::new(MockConfig::default().fail_verify(VerifyFailure::Authentication));
        let stats = connector.stats();
        let base = spawn_app(state(connector)).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/api/bulk"))
            .json(&json!({ "account": { "host": "localhost" }, "messages": [item(json!(1), "s")] }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stats.send_calls(), 0);
        assert_eq!(stats.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_send_returns_info() {
        let connector = MockConnector::default();
        let stats = connector.stats();
        let base = spawn_app(state(connector)).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/api/send"))
            .json(&json!({
                "account": { "host": "localhost", "pool": false },
                "message": { "from": "a@example.com", "to": "b@example.com", "messageId": "<fixed@example.com>" }
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["info"]["messageId"], json!("<fixed@example.com>"));
        assert_eq!(body["info"]["accepted"], json!(["b@example.com"]));
        assert!(!stats.opened_accounts()[0].pool);
        assert_eq!(stats.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_send_rejection_is_500() {
        let base = spawn_app(state(MockConnector::new(MockConfig::default().reject("bad")))).await;

        let response = reqwest::Client::new()
            .post(format!("{base}/api/send"))
            .json(&json!({
                "account": { "host": "localhost" },
                "message": { "from": "a@example.com", "to": "b@example.com", "subject": "bad" }
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_test_mode_ignores_caller_account() {
        let endpoint = spawn_account_service().await;
        let connector = MockConnector::default();
        let stats = connector.stats();
        let base = spawn_app(AppState::new(
            AccountResolver::new(TestAccountClient::new(endpoint)),
            connector,
        ))
        .await;

        let response = reqwest::Client::new()
            .post(format!("{base}/api/bulk"))
            .json(&json!({
                "test": true,
                "account": { "host": "ignored.example.com" },
                "messages": [item(json!(1), "s")]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let account = stats.opened_accounts().remove(0);
        assert_eq!(account.host, "smtp.ethereal.test");
        assert_eq!(account.effective_port(), 587);
        assert_eq!(account.auth.map(|a| a.user).as_deref(), Some("throwaway@ethereal.test"));
        assert!(account.pool);
    }

    #[tokio::test]
    async fn test_unknown_routes_and_methods_are_404() {
        let base = spawn_app(state(MockConnector::default())).await;
        let client = reqwest::Client::new();

        let response = client.get(format!("{base}/api/bulk")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = client.post(format!("{base}/api/other")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = client.get(format!("{base}/")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_responses_are_gzipped_when_accepted() {
        let base = spawn_app(state(MockConnector::default())).await;

        let messages: Vec<Value> = (0..5).map(|i| item(json!(i), "s")).collect();
        let response = reqwest::Client::new()
            .post(format!("{base}/api/bulk"))
            .header("accept-encoding", "gzip")
            .json(&json!({ "account": { "host": "localhost" }, "messages": messages }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("content-encoding")
                .and_then(|v| v.to_str().ok()),
            Some("gzip")
        );
    }

    #[tokio::test]
    async fn test_request_counter_in_state() {
        let state = state(MockConnector::default());
        let requests = state.requests.clone();
        let base = spawn_app(state).await;
        let client = reqwest::Client::new();

        for _ in 0..3 {
            client.get(format!("{base}/missing")).send().await.unwrap();
        }
        assert_eq!(requests.count(), 3);
    }
}
