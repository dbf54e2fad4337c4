//! Presence-cache maintenance sweep: drives the LRU mode's TTL eviction
//! on an interval (§4.3, §4.5's "ambient worker glue").

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use imrelay_presence::PresenceCache;

/// Run the sweep loop until `cancel` signals true. A no-op tick in full
/// mode, which carries no TTL.
pub async fn run(presence: Arc<PresenceCache>, interval_secs: u64, mut cancel: watch::Receiver<bool>) {
    let mut ticker = time::interval(Duration::from_secs(interval_secs.max(1)));
    loop {
        tokio::select! {
            _ = cancel.changed() => {
                if *cancel.borrow() {
                    tracing::info!("presence sweep loop shutting down");
                    break;
                }
            }
            _ = ticker.tick() => {
                presence.sweep_expired();
            }
        }
    }
}
