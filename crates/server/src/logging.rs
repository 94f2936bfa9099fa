//! Access logging middleware

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, info_span, Instrument};

/// Per-process request counter
#[derive(Debug, Clone, Default)]
pub struct RequestCounter(Arc<AtomicU64>);

impl RequestCounter {
    /// Next id; the first request gets 1
    pub fn next_id(&self) -> RequestId {
        RequestId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Requests seen so far
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Request id, attached as a request extension; displayed in hex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// Log BEGIN / END for every request inside a per-request span
pub async fn log_requests(
    State(counter): State<RequestCounter>,
    mut request: Request,
    next: Next,
) -> Response {
    let id = counter.next_id();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "fallback".to_owned());
    request.extensions_mut().insert(id);

    let span = info_span!("http_request", request_id = %id, method = %method, path = %path);
    async move {
        let started = Instant::now();
        info!("BEGIN");

        let response = next.run(request).await;

        let elapsed = started.elapsed();
        let status = response.status().as_u16();
        info!(status, elapsed_ms = elapsed.as_millis() as u64, "END");
        observability::metrics::record_http_request(&route, status, elapsed);
        response
    }
    .instrument(span)
    .await
}
