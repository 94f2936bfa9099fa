//! Route handlers
//!
//! Both endpoints open one session per request and close it before the
//! response is built.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, instrument};

use contracts::{Connector, Outcome, SendInfo};
use dispatcher::{admit_value, Batch};

use crate::body::{decode_json, BulkRequest, SendRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// Response of `POST /api/send`
#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub info: SendInfo,
}

/// Response of `POST /api/bulk`; outputs follow the order of `messages`
#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub outputs: Vec<Outcome>,
}

/// `POST /api/send`
#[instrument(name = "api_send", skip_all)]
pub async fn send<C: Connector + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SendResponse>, ApiError> {
    let request = SendRequest::decode(decode_json(&headers, &body)?)?;

    let account = state.resolver.resolve(Some(request.account), false).await?;
    let batch = Batch::open(state.connector.open(account).await?).await?;
    let info = batch.send_single(&request.message).await?;

    Ok(Json(SendResponse { info }))
}

/// `POST /api/bulk`
#[instrument(name = "api_bulk", skip_all)]
pub async fn bulk<C: Connector + 'static>(
    State(state): State<AppState<C>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BulkResponse>, ApiError> {
    let request = BulkRequest::decode(decode_json(&headers, &body)?)?;
    let admissions: Vec<_> = request.messages.into_iter().map(admit_value).collect();

    let account = state.resolver.resolve(Some(request.account), true).await?;
    let batch = Batch::open(state.connector.open(account).await?).await?;
    let report = batch.run_ordered(admissions).await;

    info!(
        items = report.outcomes.len(),
        failed = report.summary.failed,
        "Bulk request settled"
    );
    Ok(Json(BulkResponse {
        outputs: report.outcomes,
    }))
}

/// Any other route or method
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
