//! Redis-backed presence pub/sub for multi-node deployments.

#[cfg(feature = "redis-pubsub")]
mod implementation {
    use async_trait::async_trait;
    use tokio::sync::broadcast;
    use tracing::{error, warn};

    use crate::bridge::PresencePubSub;

    /// Forwards a Redis channel's messages onto an in-process broadcast
    /// channel, so subscribers get the same cheap-clone receiver handle
    /// regardless of transport.
    pub struct RedisPresencePubSub {
        url: String,
        channel: String,
        tx: broadcast::Sender<String>,
    }

    impl std::fmt::Debug for RedisPresencePubSub {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RedisPresencePubSub")
                .field("channel", &self.channel)
                .finish()
        }
    }

    impl RedisPresencePubSub {
        pub fn new(url: &str, channel: &str, buffer_size: usize) -> Self {
            let (tx, _rx) = broadcast::channel(buffer_size);
            let bridge = Self {
                url: url.to_string(),
                channel: channel.to_string(),
                tx,
            };
            bridge.spawn_listener();
            bridge
        }

        fn spawn_listener(&self) {
            let url = self.url.clone();
            let channel = self.channel.clone();
            let tx = self.tx.clone();
            tokio::spawn(async move {
                loop {
                    match Self::listen_once(&url, &channel, &tx).await {
                        Ok(()) => return,
                        Err(err) => {
                            warn!(error = %err, "presence redis subscription dropped, reconnecting");
                            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                        }
                    }
                }
            });
        }

        async fn listen_once(
            url: &str,
            channel: &str,
            tx: &broadcast::Sender<String>,
        ) -> Result<(), redis::RedisError> {
            let client = redis::Client::open(url)?;
            let mut pubsub = client.get_async_pubsub().await?;
            pubsub.subscribe(channel).await?;
            let mut stream = pubsub.on_message();
            use futures::StreamExt;
            while let Some(msg) = stream.next().await {
                if let Ok(payload) = msg.get_payload::<String>() {
                    let _ = tx.send(payload);
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PresencePubSub for RedisPresencePubSub {
        async fn publish(&self, payload: String) {
            let client = match redis::Client::open(self.url.as_str()) {
                Ok(client) => client,
                Err(err) => {
                    error!(error = %err, "failed to open redis client for presence publish");
                    return;
                }
            };
            let Ok(mut conn) = client.get_multiplexed_async_connection().await else {
                error!("failed to connect to redis for presence publish");
                return;
            };
            let result: Result<i64, redis::RedisError> = redis::cmd("PUBLISH")
                .arg(&self.channel)
                .arg(&payload)
                .query_async(&mut conn)
                .await;
            if let Err(err) = result {
                error!(error = %err, "presence PUBLISH failed");
            }
        }

        async fn subscribe(&self) -> broadcast::Receiver<String> {
            self.tx.subscribe()
        }
    }
}

#[cfg(not(feature = "redis-pubsub"))]
mod implementation {
    use async_trait::async_trait;
    use tokio::sync::broadcast;

    use crate::bridge::PresencePubSub;

    /// Stub bridge when the `redis-pubsub` feature is disabled.
    #[derive(Debug)]
    pub struct RedisPresencePubSub {
        tx: broadcast::Sender<String>,
    }

    impl RedisPresencePubSub {
        pub fn new(_url: &str, _channel: &str, buffer_size: usize) -> Self {
            let (tx, _rx) = broadcast::channel(buffer_size.max(1));
            Self { tx }
        }
    }

    #[async_trait]
    impl PresencePubSub for RedisPresencePubSub {
        async fn publish(&self, _payload: String) {}

        async fn subscribe(&self) -> broadcast::Receiver<String> {
            self.tx.subscribe()
        }
    }
}

pub use implementation::RedisPresencePubSub;
