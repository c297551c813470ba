//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy handler, upload server, upload workers produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint (optional, proxy only)
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over the configured level
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
