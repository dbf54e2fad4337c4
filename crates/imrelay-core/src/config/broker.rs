//! Broker topic/partition configuration (§6 External Interfaces).

use serde::{Deserialize, Serialize};

/// Settings for the message broker the dispatcher consumes from and the
/// offline worker consumes from in turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Input topic carrying stored messages awaiting push.
    #[serde(default = "default_to_push_topic")]
    pub to_push_topic: String,
    /// Output topic carrying messages that need offline-push fan-out.
    #[serde(default = "default_to_offline_push_topic")]
    pub to_offline_push_topic: String,
    /// Bounded channel capacity backing each in-process partition queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            to_push_topic: default_to_push_topic(),
            to_offline_push_topic: default_to_offline_push_topic(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_to_push_topic() -> String {
    "to-push".to_string()
}

fn default_to_offline_push_topic() -> String {
    "to-offline-push".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}
