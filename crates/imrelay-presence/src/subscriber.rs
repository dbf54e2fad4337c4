//! The presence pub/sub subscriber task (§4.3).
//!
//! Subscribes once, waits for the online-status scan to finish (full
//! mode) or for the caller to advance the phase immediately (LRU mode,
//! which has no scan), drains whatever backlog already accumulated on the
//! channel, flips the phase to `DoSubscribeOver`, and then applies
//! deltas forever.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bridge::PresencePubSub;
use crate::cache::PresenceCache;
use crate::phase::{Phase, PresencePhase};
use crate::protocol;

/// Spawn the subscriber task. The returned handle runs until the pub/sub
/// channel closes.
pub fn spawn(
    cache: Arc<PresenceCache>,
    pubsub: Arc<dyn PresencePubSub>,
    phase: Arc<PresencePhase>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = pubsub.subscribe().await;

        phase.wait_at_least(Phase::DoOnlineStatusOver).await;
        drain_backlog(&cache, &mut rx);
        phase.advance_to(Phase::DoSubscribeOver);

        loop {
            match rx.recv().await {
                Ok(payload) => apply_payload(&cache, &payload),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "presence subscriber lagged, dropped messages");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    })
}

fn drain_backlog(cache: &Arc<PresenceCache>, rx: &mut broadcast::Receiver<String>) {
    loop {
        match rx.try_recv() {
            Ok(payload) => apply_payload(cache, &payload),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "presence subscriber backlog lagged");
            }
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                return;
            }
        }
    }
}

fn apply_payload(cache: &Arc<PresenceCache>, payload: &str) {
    match protocol::parse(payload) {
        Ok(delta) => cache.apply_delta(&delta),
        Err(err) => tracing::warn!(error = %err, payload, "dropping malformed presence payload"),
    }
}
