//! Graceful stop for the proxy and upload servers.
//!
//! Each server subscribes once before it starts serving. When the signal
//! fires it stops accepting connections and lets in-flight requests finish.

use tokio::sync::broadcast;

/// Broadcast handle shared by the binary and every server it runs.
#[derive(Clone)]
pub struct Shutdown {
    sender: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Receiver handed to `HttpServer::run` or `UploadServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Tell every subscribed server to stop. Returns how many were listening.
    pub fn trigger(&self) -> usize {
        let listening = self.sender.send(()).unwrap_or(0);
        tracing::info!(listening, "Shutdown triggered");
        listening
    }

    /// Trigger once the process receives SIGINT or SIGTERM.
    pub fn trigger_on_signal(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            crate::lifecycle::signals::wait_for_signal().await;
            shutdown.trigger();
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
