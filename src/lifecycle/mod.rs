//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Bind listener (last)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → servers stop accepting → in-flight requests drain → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: configuration errors are fatal before any socket is bound
//! - Both servers (proxy, upload) share the same shutdown wiring

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
