//! Shutdown coordination.

use std::time::Duration;

use axum_server::Handle;
use tokio::sync::broadcast;

/// How long in-flight downloads get to finish after shutdown starts.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Coordinator for graceful shutdown.
///
/// Background tasks subscribe to the broadcast channel; listeners share one
/// `axum_server::Handle` so a single call drains them all.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    handle: Handle,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            handle: Handle::new(),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Server handle shared by every listener.
    pub fn handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Stop accepting connections and notify background tasks.
    pub fn trigger(&self) {
        self.handle.graceful_shutdown(Some(DRAIN_TIMEOUT));
        let _ = self.tx.send(());
    }

    /// Number of background tasks still subscribed.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 1);

        shutdown.trigger();
        assert!(rx.recv().await.is_ok());
    }
}
