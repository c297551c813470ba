//! Upload benchmark server.
//!
//! # Responsibilities
//! - Accept `POST /upload` bodies of any size
//! - Drain each body in bounded reads while timing it
//! - Append one record per upload and persist the full set
//!
//! # Design Decisions
//! - The records lock is the single serialization point for append + persist,
//!   so concurrent uploads never interleave file replacements
//! - The lock is released only after the file write finishes, even when the
//!   request that started it is cancelled
//! - A failed persist still keeps the record in memory; the next save includes it

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use futures_util::TryStreamExt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, Mutex};
use tokio_util::io::StreamReader;
use tower_http::trace::TraceLayer;

use crate::observability::metrics;
use crate::upload::persist::{CsvSink, PersistError};
use crate::upload::record::UploadRecord;

/// Size of each read while draining an upload body.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Error type for a single upload request.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to read upload body: {0}")]
    Body(#[source] io::Error),

    #[error("failed to persist results: {0}")]
    Persist(#[from] PersistError),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Upload failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Shared upload state: the record log and where it is persisted.
#[derive(Clone)]
struct UploadState {
    records: Arc<Mutex<Vec<UploadRecord>>>,
    sink: CsvSink,
}

/// Upload benchmark server.
#[derive(Clone)]
pub struct UploadServer {
    state: UploadState,
}

impl UploadServer {
    /// Server persisting its records to `out_file`. Nothing is bound yet.
    pub fn new(out_file: impl Into<PathBuf>) -> Self {
        Self {
            state: UploadState {
                records: Arc::new(Mutex::new(Vec::new())),
                sink: CsvSink::new(out_file),
            },
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/upload", post(handle_upload))
            .with_state(self.state.clone())
            .layer(DefaultBodyLimit::disable())
            .layer(TraceLayer::new_for_http())
    }

    /// Append `record` and persist every record seen so far.
    pub async fn record(&self, record: UploadRecord) -> Result<(), PersistError> {
        self.state.append(record).await
    }

    /// Snapshot of all records, oldest first.
    pub async fn records(&self) -> Vec<UploadRecord> {
        self.state.records.lock().await.clone()
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        tracing::info!(
            address = %listener.local_addr()?,
            out_file = %self.state.sink.path().display(),
            "Upload server starting"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Upload server stopped");
        Ok(())
    }
}

impl UploadState {
    async fn append(&self, record: UploadRecord) -> Result<(), PersistError> {
        let mut records = self.records.clone().lock_owned().await;
        records.push(record);

        // The guard travels with the write: a dropped request cannot release
        // the lock before the file has been replaced.
        let sink = self.sink.clone();
        tokio::task::spawn_blocking(move || sink.save_blocking(records.as_slice())).await?
    }
}

async fn handle_upload(
    State(state): State<UploadState>,
    body: Body,
) -> Result<String, UploadError> {
    let start_time = Instant::now();
    let bytes_received = drain_body(body).await.map_err(UploadError::Body)?;
    let record = UploadRecord::new(bytes_received, start_time.elapsed());

    tracing::info!(
        bytes_received = record.bytes_received,
        duration_s = record.duration_s,
        throughput_mbps = record.throughput_mbps,
        "Upload recorded"
    );
    metrics::record_upload(record.bytes_received, record.throughput_mbps);

    state.append(record.clone()).await?;
    Ok(format!("Upload recorded: {record}"))
}

/// Read `body` to the end in `UPLOAD_CHUNK_SIZE` reads, returning its length.
pub async fn drain_body(body: Body) -> io::Result<u64> {
    let stream = body.into_data_stream().map_err(io::Error::other);
    let mut reader = StreamReader::new(stream);
    let mut chunk = vec![0u8; UPLOAD_CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(total);
        }
        total += n as u64;
    }
}
