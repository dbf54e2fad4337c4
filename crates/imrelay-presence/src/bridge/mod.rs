//! Presence pub/sub transport: in-memory for single-node deployments, an
//! optional Redis-backed bridge for multi-node ones.

pub mod memory;
pub mod redis_bridge;

pub use memory::MemoryPresencePubSub;
pub use redis_bridge::RedisPresencePubSub;

use async_trait::async_trait;
use imrelay_core::AppResult;

/// The presence pub/sub channel contract: publish and subscribe to text
/// payloads in the `protocol` module's wire format.
#[async_trait]
pub trait PresencePubSub: Send + Sync + std::fmt::Debug + 'static {
    async fn publish(&self, payload: String);

    /// Subscribe to the channel; every call returns an independent
    /// receiver that only sees messages published after it subscribes.
    async fn subscribe(&self) -> tokio::sync::broadcast::Receiver<String>;
}
