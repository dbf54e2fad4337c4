//! Default in-process broker transport.
//!
//! `imrelay-core`'s `BrokerProducer`/`BrokerConsumer` traits are the seam a
//! real Kafka/Pulsar client plugs into; no such adapter is implemented here.
//! This is the local fallback that lets the `to-push` → dispatcher →
//! `to-offline-push` → worker pipeline run inside a single process, much
//! like a storage layer's local filesystem provider stands in for S3/SMB
//! until a deployment configures one of those.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use imrelay_core::error::AppError;
use imrelay_core::traits::{BrokerConsumer, BrokerHandler, BrokerProducer, BrokerRecord};
use imrelay_core::AppResult;

struct Topic {
    sender: mpsc::Sender<BrokerRecord>,
    receiver: Option<mpsc::Receiver<BrokerRecord>>,
}

/// A single-process broker backed by one bounded `mpsc` channel per topic.
/// Each topic supports exactly one consumer; calling `run` on a topic a
/// second time is a configuration error.
#[derive(Debug)]
pub struct LocalBroker {
    capacity: usize,
    topics: Mutex<HashMap<String, Topic>>,
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic").field("has_receiver", &self.receiver.is_some()).finish()
    }
}

impl LocalBroker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn sender_for(&self, topic: &str) -> mpsc::Sender<BrokerRecord> {
        let mut topics = self.topics.lock().expect("local broker mutex poisoned");
        if let Some(existing) = topics.get(topic) {
            return existing.sender.clone();
        }
        let (tx, rx) = mpsc::channel(self.capacity);
        topics.insert(
            topic.to_string(),
            Topic {
                sender: tx.clone(),
                receiver: Some(rx),
            },
        );
        tx
    }

    fn receiver_for(&self, topic: &str) -> AppResult<mpsc::Receiver<BrokerRecord>> {
        let mut topics = self.topics.lock().expect("local broker mutex poisoned");
        let entry = topics.entry(topic.to_string()).or_insert_with(|| {
            let (tx, rx) = mpsc::channel(self.capacity);
            Topic { sender: tx, receiver: Some(rx) }
        });
        entry
            .receiver
            .take()
            .ok_or_else(|| AppError::configuration(format!("topic '{topic}' already has a consumer")))
    }
}

#[async_trait]
impl BrokerProducer for LocalBroker {
    async fn publish(&self, topic: &str, record: BrokerRecord) -> AppResult<()> {
        let tx = self.sender_for(topic);
        tx.send(record)
            .await
            .map_err(|_| AppError::transient(format!("local broker channel for '{topic}' is closed")))
    }
}

#[async_trait]
impl BrokerConsumer for LocalBroker {
    async fn run(&self, topic: &str, handler: std::sync::Arc<dyn BrokerHandler>) -> AppResult<()> {
        let mut receiver = self.receiver_for(topic)?;
        tracing::info!(topic, "local broker consumer started");
        while let Some(record) = receiver.recv().await {
            if let Err(err) = handler.handle(record).await {
                tracing::warn!(topic, error = %err, "broker handler returned an error");
            }
        }
        tracing::info!(topic, "local broker consumer loop ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct CountingHandler {
        count: AtomicUsize,
    }

    #[async_trait]
    impl BrokerHandler for CountingHandler {
        async fn handle(&self, _record: BrokerRecord) -> AppResult<()> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn publishes_flow_to_the_consumer() {
        let broker = Arc::new(LocalBroker::new(8));
        let handler = Arc::new(CountingHandler::default());

        let consumer = Arc::clone(&broker);
        let run_handler: Arc<dyn BrokerHandler> = handler.clone();
        let consume_task = tokio::spawn(async move { consumer.run("t", run_handler).await });

        for i in 0..3 {
            broker
                .publish(
                    "t",
                    BrokerRecord {
                        partition_key: format!("k{i}"),
                        payload: vec![i as u8],
                    },
                )
                .await
                .unwrap();
        }

        for _ in 0..50 {
            if handler.count.load(Ordering::SeqCst) == 3 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        consume_task.abort();

        assert_eq!(handler.count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn a_second_consumer_on_the_same_topic_is_rejected() {
        let broker = LocalBroker::new(4);
        let handler: Arc<dyn BrokerHandler> = Arc::new(CountingHandler::default());
        let _ = broker.receiver_for("dup").unwrap();
        let err = broker.receiver_for("dup").unwrap_err();
        assert_eq!(err.kind, imrelay_core::error::ErrorKind::Configuration);
        let _ = handler;
    }
}
