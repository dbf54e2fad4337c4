//! In-memory presence pub/sub for single-node deployments.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::PresencePubSub;

/// Broadcast-channel-backed pub/sub. Messages published before the first
/// subscriber joins are dropped, matching `broadcast::Sender` semantics.
#[derive(Debug)]
pub struct MemoryPresencePubSub {
    tx: broadcast::Sender<String>,
}

impl MemoryPresencePubSub {
    pub fn new(buffer_size: usize) -> Self {
        let (tx, _rx) = broadcast::channel(buffer_size);
        Self { tx }
    }
}

#[async_trait]
impl PresencePubSub for MemoryPresencePubSub {
    async fn publish(&self, payload: String) {
        let _ = self.tx.send(payload);
    }

    async fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_message() {
        let bridge = MemoryPresencePubSub::new(16);
        let mut rx = bridge.subscribe().await;
        bridge.publish("u:1:online".to_string()).await;
        assert_eq!(rx.recv().await.unwrap(), "u:1:online");
    }
}
