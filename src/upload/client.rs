//! Upload benchmark client.
//!
//! # Responsibilities
//! - Run a fixed pool of workers against one upload URL
//! - Each worker POSTs the same block until the shared deadline
//! - Persist one record per worker once every worker is done
//!
//! # Design Decisions
//! - Workers own their payload, counters and HTTP client; nothing is shared
//!   until a worker has finished
//! - A failed request ends that worker only; it is never retried
//! - No per-request timeout; the run duration is the only bound

use axum::body::Bytes;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

use crate::observability::metrics;
use crate::upload::persist::{CsvSink, PersistError};
use crate::upload::record::ClientRecord;

/// Upload benchmark client.
#[derive(Debug, Clone)]
pub struct UploadClient {
    url: String,
    clients: usize,
    duration: Duration,
    chunk_size: usize,
    sink: CsvSink,
}

/// Outcome of a full client run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// One record per worker, ordered by `client_id`.
    pub records: Vec<ClientRecord>,
}

impl RunSummary {
    pub fn total_bytes(&self) -> u64 {
        self.records.iter().map(|r| r.bytes_sent).sum()
    }

    /// Sum of per-worker throughput.
    pub fn aggregate_throughput_mbps(&self) -> f64 {
        self.records.iter().map(|r| r.throughput_mbps).sum()
    }
}

impl UploadClient {
    pub fn new(
        url: impl Into<String>,
        clients: usize,
        duration: Duration,
        chunk_size: usize,
        out_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            clients,
            duration,
            chunk_size,
            sink: CsvSink::new(out_file),
        }
    }

    /// Run every worker to completion and persist the results.
    pub async fn run(&self) -> Result<RunSummary, PersistError> {
        tracing::info!(
            url = %self.url,
            clients = self.clients,
            duration_secs = self.duration.as_secs_f64(),
            chunk_size = self.chunk_size,
            "Starting upload run"
        );

        let mut workers = JoinSet::new();
        for client_id in 0..self.clients {
            workers.spawn(upload_worker(
                client_id,
                self.url.clone(),
                self.chunk_size,
                self.duration,
            ));
        }

        let mut records = Vec::with_capacity(self.clients);
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(record) => records.push(record),
                Err(e) => tracing::error!(error = %e, "Upload worker aborted"),
            }
        }
        records.sort_by_key(|r| r.client_id);

        self.save_results(records.clone()).await?;
        tracing::info!(
            out_file = %self.sink.path().display(),
            workers = records.len(),
            "Upload run complete"
        );

        Ok(RunSummary { records })
    }

    /// Replace the output file with `records`.
    pub async fn save_results(&self, records: Vec<ClientRecord>) -> Result<(), PersistError> {
        self.sink.save(records).await
    }
}

async fn upload_worker(
    client_id: usize,
    url: String,
    chunk_size: usize,
    duration: Duration,
) -> ClientRecord {
    // Built once; every request sends a cheap clone of the same buffer.
    let payload = Bytes::from(vec![b'0'; chunk_size]);
    let deadline = deadline_after(duration);
    let mut bytes_sent = 0u64;

    match reqwest::Client::builder().no_proxy().build() {
        Ok(http) => {
            while deadline.map_or(true, |deadline| Instant::now() < deadline) {
                if let Err(e) = post_block(&http, &url, payload.clone()).await {
                    tracing::warn!(client_id, error = %e, "Upload request failed, stopping worker");
                    break;
                }
                bytes_sent += payload.len() as u64;
            }
        }
        Err(e) => {
            tracing::error!(client_id, error = %e, "Failed to build HTTP client");
        }
    }

    metrics::record_client_bytes(client_id, bytes_sent);
    let record = ClientRecord::finish(client_id, bytes_sent, duration);
    tracing::debug!(client_id, bytes_sent, throughput_mbps = record.throughput_mbps, "Worker finished");
    record
}

/// When a run of `duration` started now ends. `None` if the instant is not
/// representable; the worker then runs until a request fails.
fn deadline_after(duration: Duration) -> Option<Instant> {
    Instant::now().checked_add(duration)
}

/// One POST, confirmed by a success status and a fully read response body.
async fn post_block(http: &reqwest::Client, url: &str, payload: Bytes) -> reqwest::Result<()> {
    let response = http.post(url).body(payload).send().await?.error_for_status()?;
    response.bytes().await?;
    Ok(())
}
