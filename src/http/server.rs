//! HTTP server setup for the reverse proxy.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, request ID, body limit)
//! - Bind server to listener with graceful shutdown
//! - Forward every request to the single upstream

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Uri},
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::forward::{ForwardError, Forwarder};
use crate::http::request::{propagate_request_id_layer, request_id_of, set_request_id_layer};
use crate::http::response;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ForwardError> {
        let forwarder = Arc::new(Forwarder::from_config(&config)?);
        let state = AppState { forwarder };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or driving directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            target_base = %self.config.target_base,
            rewrite_host = self.config.rewrite_host,
            "Proxy server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Proxy server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Rewrites the URL onto the upstream and relays the round trip.
async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id_of(&headers).to_string();

    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let target_url = state.forwarder.upstream().url_for(path_and_query);

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path_and_query,
        target = %target_url,
        "Forwarding request"
    );

    let method_str = method.to_string();
    match state.forwarder.forward(method, &target_url, &headers, body).await {
        Ok(upstream) => {
            tracing::debug!(
                request_id = %request_id,
                status = %upstream.status,
                bytes = upstream.body.len(),
                "Upstream responded"
            );
            metrics::record_request(&method_str, upstream.status.as_u16(), start_time);
            response::from_upstream(upstream)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                timeout = e.is_timeout(),
                error = %e,
                "Upstream error"
            );
            metrics::record_request(&method_str, 502, start_time);
            response::bad_gateway(&e)
        }
    }
}
