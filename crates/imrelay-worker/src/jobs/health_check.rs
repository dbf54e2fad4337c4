//! Periodic check that the presence cache's init phase reached
//! `DoSubscribeOver` (§4.3, §4.5's "ambient worker glue"). A cache stuck
//! below that phase is serving a half-populated view; this surfaces it
//! in logs rather than failing silently.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use imrelay_presence::{Phase, PresencePhase};

pub async fn run(phase: Arc<PresencePhase>, interval_secs: u64, mut cancel: watch::Receiver<bool>) {
    let mut ticker = time::interval(Duration::from_secs(interval_secs.max(1)));
    loop {
        tokio::select! {
            _ = cancel.changed() => {
                if *cancel.borrow() {
                    tracing::info!("init-phase health check shutting down");
                    break;
                }
            }
            _ = ticker.tick() => {
                let current = phase.current();
                if current < Phase::DoSubscribeOver {
                    tracing::warn!(?current, "presence cache has not reached DoSubscribeOver");
                }
            }
        }
    }
}
