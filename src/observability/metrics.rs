//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): forwarded requests by method, status
//! - `proxy_request_duration_seconds` (histogram): round-trip latency
//! - `uploads_total` (counter): completed uploads seen by the upload server
//! - `upload_bytes_total` (counter): bytes drained by the upload server
//! - `upload_throughput_mbps` (histogram): per-upload throughput
//! - `client_bytes_sent_total` (counter): bytes acknowledged to upload workers

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    counter!("proxy_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    histogram!("proxy_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record one upload drained by the upload server.
pub fn record_upload(bytes: u64, throughput_mbps: f64) {
    counter!("uploads_total").increment(1);
    counter!("upload_bytes_total").increment(bytes);
    histogram!("upload_throughput_mbps").record(throughput_mbps);
}

/// Record bytes a client worker had acknowledged.
pub fn record_client_bytes(client_id: usize, bytes: u64) {
    counter!("client_bytes_sent_total", "client_id" => client_id.to_string()).increment(bytes);
}
