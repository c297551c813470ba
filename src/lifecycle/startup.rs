//! Startup helpers.

use tokio::net::TcpListener;

/// Bind a listener on `address` (`host:port`, host may be a name).
pub async fn bind_listener(address: &str) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}
