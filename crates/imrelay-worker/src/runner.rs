//! Worker runner: wires the offline-push consumer loop together with the
//! presence-cache maintenance sweep and init-phase health check (§4.5).

use std::sync::Arc;

use tokio::sync::watch;

use imrelay_core::config::WorkerConfig;
use imrelay_core::traits::{BrokerConsumer, BrokerHandler};
use imrelay_core::AppResult;
use imrelay_presence::{PresenceCache, PresencePhase};

use crate::jobs::{health_check, offline_push::OfflinePushHandler, presence_sweep};

pub const OFFLINE_PUSH_TOPIC: &str = "to-offline-push";

/// Runs the offline push worker's consumer loop plus its ambient
/// maintenance loops until the cancel signal fires.
#[derive(Debug)]
pub struct WorkerRunner {
    consumer: Arc<dyn BrokerConsumer>,
    handler: Arc<OfflinePushHandler>,
    presence: Arc<PresenceCache>,
    phase: Arc<PresencePhase>,
    config: WorkerConfig,
}

impl WorkerRunner {
    pub fn new(
        consumer: Arc<dyn BrokerConsumer>,
        handler: Arc<OfflinePushHandler>,
        presence: Arc<PresenceCache>,
        phase: Arc<PresencePhase>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            consumer,
            handler,
            presence,
            phase,
            config,
        }
    }

    /// Run until `cancel` signals true, or the consumer loop itself
    /// exits (an unrecoverable broker error).
    pub async fn run(&self, cancel: watch::Receiver<bool>) -> AppResult<()> {
        if !self.config.enabled {
            tracing::info!("offline push worker disabled, not starting");
            return Ok(());
        }

        let sweep = presence_sweep::run(
            Arc::clone(&self.presence),
            self.config.presence_sweep_interval_secs,
            cancel.clone(),
        );
        let health = health_check::run(
            Arc::clone(&self.phase),
            self.config.presence_sweep_interval_secs,
            cancel.clone(),
        );
        let handler = Arc::clone(&self.handler) as Arc<dyn BrokerHandler>;

        tokio::select! {
            result = self.consumer.run(OFFLINE_PUSH_TOPIC, handler) => {
                if let Err(err) = &result {
                    tracing::error!(error = %err, "offline-push consumer loop exited with error");
                }
                result
            }
            _ = sweep => Ok(()),
            _ = health => Ok(()),
        }
    }
}
