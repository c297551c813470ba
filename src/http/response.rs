//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn a buffered upstream response into the caller's response
//! - Map forwarding failures to 502 Bad Gateway
//!
//! Hop-by-hop headers are already gone by the time a response reaches here.

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::forward::{ForwardError, UpstreamResponse};

/// Relay status, headers and body exactly as the upstream sent them.
pub fn from_upstream(upstream: UpstreamResponse) -> Response {
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = upstream.headers;
    response
}

/// Fixed failure response for any error reaching the upstream.
pub fn bad_gateway(error: &ForwardError) -> Response {
    (StatusCode::BAD_GATEWAY, format!("Bad gateway: {error}")).into_response()
}
