//! Broker abstraction for the `to-push` / `to-offline-push` topics
//! (§6 External Interfaces).
//!
//! No production transport (Kafka, Pulsar, ...) is implemented here (§1
//! lists broker adapters as out of scope); this is the seam a deployment
//! plugs a real broker client into. Consumer groups process a sequential
//! stream per partition and commit offsets after the handler returns,
//! i.e. at-least-once delivery — handlers must be idempotent or tolerate
//! redelivery.

use async_trait::async_trait;

use crate::result::AppResult;

/// One broker record as handed to a consumer.
#[derive(Debug, Clone)]
pub struct BrokerRecord {
    /// Partition key, the conversation id for both topics this system uses.
    pub partition_key: String,
    /// Protobuf- or JSON-encoded payload; callers decode per their schema.
    pub payload: Vec<u8>,
}

/// Publish side of the broker contract.
#[async_trait]
pub trait BrokerProducer: Send + Sync + std::fmt::Debug + 'static {
    async fn publish(&self, topic: &str, record: BrokerRecord) -> AppResult<()>;
}

/// A per-partition handler invoked for each record in order. Returning
/// `Err` logs the failure; the broker still commits the offset, matching
/// the dispatcher's "never retried" failure policy (§7).
#[async_trait]
pub trait BrokerHandler: Send + Sync + 'static {
    async fn handle(&self, record: BrokerRecord) -> AppResult<()>;
}

/// Consume side of the broker contract.
#[async_trait]
pub trait BrokerConsumer: Send + Sync + std::fmt::Debug + 'static {
    /// Run the consume loop for `topic` until cancelled, dispatching each
    /// record to `handler` and committing its offset after the handler
    /// returns (success or failure alike).
    async fn run(&self, topic: &str, handler: std::sync::Arc<dyn BrokerHandler>) -> AppResult<()>;
}
