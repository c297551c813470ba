//! Upload throughput simulator.
//!
//! # Data Flow
//! ```text
//! Server:
//!     POST /upload → server.rs (drain body in 64 KiB reads, time it)
//!         → record.rs (UploadRecord, throughput)
//!         → persist.rs (append under lock, atomic CSV replace)
//!
//! Client:
//!     client.rs (N workers POST a fixed block until the deadline)
//!         → record.rs (ClientRecord per worker)
//!         → persist.rs (atomic CSV replace)
//! ```
//!
//! # Design Decisions
//! - Records are append-only for the life of the process
//! - The CSV is always replaced whole via temp file + rename

pub mod client;
pub mod persist;
pub mod record;
pub mod server;

pub use client::{RunSummary, UploadClient};
pub use persist::{CsvRow, CsvSink, PersistError};
pub use record::{throughput_mbps, ClientRecord, UploadRecord};
pub use server::{UploadError, UploadServer, UPLOAD_CHUNK_SIZE};
