//! Upstream forwarding.
//!
//! # Responsibilities
//! - Map an inbound path + query onto the configured target base
//! - Prepare the upstream header set (hop-by-hop filtering, Host rewrite)
//! - Perform exactly one upstream round trip with a fixed timeout
//!
//! # Design Decisions
//! - One shared `reqwest::Client`; redirects are never followed
//! - No decompression: `accept-encoding` is stripped instead
//! - No retries; any failure is reported to the caller as-is

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::config::{parse_target_base, ProxyConfig, ValidationError};
use crate::http::headers::{filter_request_headers, filter_response_headers};

/// Error type for forwarding.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid target base: {0}")]
    InvalidTarget(#[from] ValidationError),

    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

impl ForwardError {
    /// Whether the upstream did not answer within the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ForwardError::Upstream(e) if e.is_timeout())
    }
}

/// The fixed upstream every request is forwarded to.
#[derive(Debug, Clone)]
pub struct Upstream {
    /// Scheme, authority and base path, without a trailing slash.
    base: String,
    /// `host[:port]` of the target, used for Host rewriting.
    authority: HeaderValue,
}

impl Upstream {
    /// Parse an absolute http(s) base URL.
    pub fn parse(target_base: &str) -> Result<Self, ForwardError> {
        let mut url = parse_target_base(target_base)?;
        let authority = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        let authority = HeaderValue::from_str(&authority).map_err(|e| {
            ValidationError::InvalidTarget(target_base.trim().to_string(), e.to_string())
        })?;

        url.set_query(None);
        url.set_fragment(None);
        let base = url.as_str().trim_end_matches('/').to_string();

        Ok(Self { base, authority })
    }

    /// Full upstream URL for an inbound raw path and query string.
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}/{}", self.base, path_and_query.trim_start_matches('/'))
    }

    /// Value the forwarded `Host` header takes when rewriting is enabled.
    pub fn host_header(&self) -> &HeaderValue {
        &self.authority
    }
}

/// What came back from the upstream, fully buffered.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Stateless single-hop forwarder shared by all requests.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    upstream: Upstream,
    rewrite_host: bool,
}

impl Forwarder {
    /// Build a forwarder from validated proxy configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ForwardError> {
        let upstream = Upstream::parse(&config.target_base)?;
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(config.timeouts.upstream_secs))
            .no_proxy()
            .build()
            .map_err(ForwardError::Client)?;

        Ok(Self {
            client,
            upstream,
            rewrite_host: config.rewrite_host,
        })
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Header set sent upstream for the given inbound headers.
    pub fn prepare_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = filter_request_headers(inbound);
        if self.rewrite_host {
            headers.insert(header::HOST, self.upstream.host_header().clone());
        }
        headers
    }

    /// Send one request upstream and buffer the full response.
    pub async fn forward(
        &self,
        method: Method,
        target_url: &str,
        inbound_headers: &HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse, ForwardError> {
        let mut request = self
            .client
            .request(method, target_url)
            .headers(self.prepare_headers(inbound_headers));
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = filter_response_headers(response.headers());
        let body = response.bytes().await?;

        Ok(UpstreamResponse { status, headers, body })
    }
}
