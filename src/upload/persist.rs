//! Atomic CSV persistence.
//!
//! Rows are written to a temporary file in the destination directory, synced,
//! and renamed over the target. A reader sees either the previous complete
//! file or the new complete file, never a partial one.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A row type with a fixed CSV header.
///
/// The header is written even when there are no rows.
pub trait CsvRow: Serialize {
    const HEADER: &'static [&'static str];
}

/// Error type for persistence.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to replace results file: {0}")]
    Replace(#[from] tempfile::PersistError),

    #[error("persistence task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Destination CSV file, replaced whole on every save.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file with `rows`, blocking the current thread.
    pub fn save_blocking<R: CsvRow>(&self, rows: &[R]) -> Result<(), PersistError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".results-")
            .suffix(".tmp")
            .tempfile_in(dir)?;

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file_mut());
            writer.write_record(R::HEADER)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;

        // On any earlier return the temp file is dropped and removed.
        tmp.persist(&self.path)?;

        tracing::debug!(path = %self.path.display(), rows = rows.len(), "Results persisted");
        Ok(())
    }

    /// Replace the file with `rows` on the blocking thread pool.
    pub async fn save<R>(&self, rows: Vec<R>) -> Result<(), PersistError>
    where
        R: CsvRow + Send + 'static,
    {
        let sink = self.clone();
        tokio::task::spawn_blocking(move || sink.save_blocking(&rows)).await?
    }
}
