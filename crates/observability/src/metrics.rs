//! Metrics recording
//!
//! Thin wrappers over the `metrics` facade. Without an installed recorder
//! every call is a no-op, so library crates record unconditionally.

use std::time::Duration;

use metrics::{counter, histogram};

/// Record one finished send
pub fn record_send_outcome(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("nf_smtp_sends_total", "status" => status).increment(1);
}

/// Record a closed batch
pub fn record_batch(mode: &'static str, size: u64, failed: u64, elapsed: Duration) {
    histogram!("nf_smtp_batch_size", "mode" => mode).record(size as f64);
    histogram!("nf_smtp_batch_duration_ms", "mode" => mode).record(elapsed.as_secs_f64() * 1000.0);
    if failed > 0 {
        counter!("nf_smtp_batch_failed_items_total", "mode" => mode).increment(failed);
    }
}

/// Record one HTTP request
pub fn record_http_request(route: &str, status: u16, elapsed: Duration) {
    counter!(
        "nf_smtp_http_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("nf_smtp_http_request_duration_ms", "route" => route.to_string())
        .record(elapsed.as_secs_f64() * 1000.0);
}
