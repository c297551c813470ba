//! Header-filtering reverse proxy and upload throughput simulator.
//!
//! # Architecture Overview
//!
//! ```text
//!   header-proxy                                   upload-sim
//!   ┌───────────────────────────────────┐          ┌──────────────────────────────┐
//!   │ config → http::server             │          │ --mode server                │
//!   │            │                      │          │   upload::server → persist   │
//!   │            ▼                      │          │                              │
//!   │   http::forward ──▶ upstream      │          │ --mode client                │
//!   │   (headers, Host rewrite, 502)    │          │   upload::client → persist   │
//!   └───────────────────────────────────┘          └──────────────────────────────┘
//!
//!   shared: observability (tracing, metrics), lifecycle (startup, shutdown)
//! ```

// Reverse proxy
pub mod config;
pub mod http;

// Upload simulator
pub mod upload;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use upload::{UploadClient, UploadServer};
