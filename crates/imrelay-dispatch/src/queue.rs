//! Offline-push queue: publishes `{msg, offlineUserIDs}` onto the
//! `to-offline-push` topic (§4.2, §6).

use std::sync::Arc;

use imrelay_core::traits::{BrokerProducer, BrokerRecord};
use imrelay_core::types::UserId;
use imrelay_message::Message;
use serde::{Deserialize, Serialize};

pub const TOPIC: &str = "to-offline-push";

/// Wire record published to the offline-push topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflinePushRecord {
    pub msg: Message,
    pub offline_user_ids: Vec<UserId>,
}

#[derive(Debug)]
pub struct OfflinePushQueue {
    producer: Arc<dyn BrokerProducer>,
}

impl OfflinePushQueue {
    pub fn new(producer: Arc<dyn BrokerProducer>) -> Self {
        Self { producer }
    }

    /// Enqueue offline fan-out for `msg`, partitioned the same way as the
    /// input topic so per-conversation ordering carries through. Publish
    /// failure is logged, not propagated; the message is not retried
    /// (§4.2's failure semantics).
    pub async fn enqueue(&self, partition_key: String, msg: Message, offline_user_ids: Vec<UserId>) {
        if offline_user_ids.is_empty() {
            return;
        }
        let record = OfflinePushRecord { msg, offline_user_ids };
        let payload = match serde_json::to_vec(&record) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode offline-push record, dropping");
                return;
            }
        };
        if let Err(err) = self
            .producer
            .publish(TOPIC, BrokerRecord { partition_key, payload })
            .await
        {
            tracing::warn!(error = %err, "offline-push enqueue failed, message not retried");
        }
    }
}
