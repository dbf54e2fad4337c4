//! imrelay server — wires the message delivery and synchronization core
//! together and runs its two process loops: the push dispatcher consuming
//! `to-push`, and the offline push worker consuming `to-offline-push`.

mod local_broker;
mod null_adapters;

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use imrelay_core::config::{AppConfig, PresenceMode, PushStrategyKind};
use imrelay_core::error::AppError;
use imrelay_core::traits::{BrokerConsumer, BrokerHandler, BrokerProducer};
use imrelay_dispatch::{DispatchHandler, Dispatcher, HookInvoker};
use imrelay_presence::bridge::{MemoryPresencePubSub, PresencePubSub};
use imrelay_presence::{Phase, PresenceCache, PresencePhase};
use imrelay_worker::{OfflinePushHandler, WorkerRunner};

use local_broker::LocalBroker;
use null_adapters::{NullGroupMembershipSource, NullOfflinePusher, NullPresenceSource};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `config/default.toml` plus an environment
/// overlay plus `IMRELAY__`-prefixed env var overrides.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("IMRELAY_ENV").unwrap_or_else(|_| "development".to_string());
    tracing::info!("loading config (env: {})", env);
    AppConfig::load(&env)
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("starting imrelay v{}", env!("CARGO_PKG_VERSION"));

    // ── Presence cache ────────────────────────────────────────────
    let phase = PresencePhase::new();
    let presence_source = Arc::new(NullPresenceSource);
    let presence = Arc::new(match config.presence.mode {
        PresenceMode::Full => {
            tracing::info!("presence cache: full mode");
            PresenceCache::full(presence_source, &config.presence, &phase)
                .await
                .map_err(|e| AppError::internal(format!("presence cache init failed: {e}")))?
        }
        PresenceMode::Lru => {
            tracing::info!("presence cache: lru mode");
            let cache = PresenceCache::lru(presence_source, &config.presence);
            phase.advance_to(Phase::DoOnlineStatusOver);
            cache
        }
    });

    let pubsub: Arc<dyn PresencePubSub> = Arc::new(MemoryPresencePubSub::new(1024));
    imrelay_presence::subscriber::spawn(Arc::clone(&presence), Arc::clone(&pubsub), Arc::clone(&phase));
    phase.wait_ready().await;

    // ── Broker ─────────────────────────────────────────────────────
    let broker = Arc::new(LocalBroker::new(config.broker.queue_capacity));
    let producer: Arc<dyn BrokerProducer> = broker.clone();
    let consumer: Arc<dyn BrokerConsumer> = broker.clone();

    // ── Push dispatcher ────────────────────────────────────────────
    let strategy = match config.dispatch.strategy {
        PushStrategyKind::FanOutAll => {
            tracing::info!("online push strategy: fan-out-all (no gateway instances configured)");
            Arc::new(imrelay_dispatch::FanOutAllStrategy::new(
                Vec::new(),
                config.dispatch.effective_max_concurrent_workers(),
            )) as Arc<dyn imrelay_dispatch::OnlinePushStrategy>
        }
        PushStrategyKind::ConsistentHash => {
            tracing::warn!("consistent-hash strategy requested but no gateway discovery is configured, falling back to empty");
            Arc::new(imrelay_dispatch::EmptyStrategy) as Arc<dyn imrelay_dispatch::OnlinePushStrategy>
        }
        PushStrategyKind::Empty => {
            Arc::new(imrelay_dispatch::EmptyStrategy) as Arc<dyn imrelay_dispatch::OnlinePushStrategy>
        }
    };

    let offline_queue = Arc::new(imrelay_dispatch::OfflinePushQueue::new(producer.clone()));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&presence),
        strategy,
        HookInvoker::new(None, Default::default()),
        Arc::new(NullGroupMembershipSource),
        offline_queue,
    ));
    let dispatch_handler: Arc<dyn BrokerHandler> = Arc::new(DispatchHandler::new(dispatcher));

    // ── Shutdown channel ───────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Offline push worker ────────────────────────────────────────
    let offline_pusher = Arc::new(NullOfflinePusher);
    let offline_handler = Arc::new(OfflinePushHandler::new(offline_pusher));
    let worker = WorkerRunner::new(
        Arc::clone(&consumer),
        offline_handler,
        Arc::clone(&presence),
        Arc::clone(&phase),
        config.worker.clone(),
    );

    let to_push_topic = config.broker.to_push_topic.clone();
    let dispatch_consumer = Arc::clone(&consumer);
    let mut dispatch_cancel = shutdown_rx.clone();
    let dispatch_task = tokio::spawn(async move {
        tokio::select! {
            result = dispatch_consumer.run(&to_push_topic, dispatch_handler) => {
                if let Err(err) = &result {
                    tracing::error!(error = %err, "dispatch consumer loop exited with error");
                }
            }
            _ = dispatch_cancel.changed() => {
                tracing::info!("dispatch consumer loop shutting down");
            }
        }
    });

    let worker_cancel = shutdown_rx.clone();
    let worker_task = tokio::spawn(async move {
        if let Err(err) = worker.run(worker_cancel).await {
            tracing::error!(error = %err, "offline push worker exited with error");
        }
    });

    tracing::info!("imrelay running, awaiting shutdown signal");
    shutdown_signal().await;
    tracing::info!("shutdown signal received, stopping");
    let _ = shutdown_tx.send(true);

    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), dispatch_task).await;
    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), worker_task).await;

    tracing::info!("imrelay shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
