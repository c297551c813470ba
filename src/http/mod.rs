//! HTTP protocol handling subsystem (reverse proxy).
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all route)
//!     → request.rs (assign / keep x-request-id)
//!     → forward.rs (URL rewrite, header filtering, upstream round trip)
//!         → headers.rs (hop-by-hop set)
//!     → response.rs (relay upstream response or 502)
//!     → Send to client
//! ```

pub mod forward;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder, Upstream, UpstreamResponse};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
