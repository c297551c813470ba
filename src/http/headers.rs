//! Hop-by-hop header filtering.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Strip `accept-encoding` on the way upstream so responses arrive
//!   uncompressed and can be relayed byte for byte
//!
//! Every value of a repeated header (e.g. `set-cookie`) is preserved.

use axum::http::{header, HeaderMap, HeaderName};

/// Headers that only describe a single transport connection.
pub const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Whether `name` must not cross the proxy.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    // `HeaderName` is always lowercase.
    HOP_BY_HOP.contains(&name.as_str())
}

/// Headers to send upstream for an inbound request.
pub fn filter_request_headers(inbound: &HeaderMap) -> HeaderMap {
    copy_where(inbound, |name| {
        !is_hop_by_hop(name) && name != header::ACCEPT_ENCODING
    })
}

/// Headers to relay back to the caller from an upstream response.
pub fn filter_response_headers(upstream: &HeaderMap) -> HeaderMap {
    copy_where(upstream, |name| !is_hop_by_hop(name))
}

fn copy_where(src: &HeaderMap, keep: impl Fn(&HeaderName) -> bool) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(src.len());
    for (name, value) in src.iter() {
        if keep(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}
