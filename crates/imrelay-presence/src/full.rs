//! Full-mode presence cache: a concurrent map with an entry for every
//! online user (§4.3).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use imrelay_core::config::PresenceConfig;
use imrelay_core::types::UserId;
use imrelay_core::AppResult;

use crate::protocol::{online_platforms, PresenceDelta};
use crate::source::PresenceSource;

/// Concurrent map keyed by user, holding each online user's platform list.
/// Writers are the presence subscriber (single task) and the init scan;
/// readers never block on a write.
#[derive(Debug)]
pub struct FullPresenceCache {
    online: DashMap<UserId, Vec<i32>>,
}

impl FullPresenceCache {
    pub fn new() -> Self {
        Self {
            online: DashMap::new(),
        }
    }

    /// Populate the map via paginated `GetAllOnlineUsers` scans, retrying
    /// the whole scan on a transient error up to `init_retry_attempts`
    /// times with `init_retry_delay_secs` between attempts.
    pub async fn init(&self, source: &Arc<dyn PresenceSource>, config: &PresenceConfig) -> AppResult<()> {
        let mut attempt = 0;
        loop {
            match self.scan_once(source).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt + 1 < config.init_retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        error = %err,
                        "presence cache init scan failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(config.init_retry_delay_secs)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn scan_once(&self, source: &Arc<dyn PresenceSource>) -> AppResult<()> {
        self.online.clear();
        let mut cursor: Option<String> = None;
        loop {
            let page = source.scan_online_users(cursor.as_deref()).await?;
            for (user_id, platforms) in page.users {
                if !platforms.is_empty() {
                    self.online.insert(user_id, platforms);
                }
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(())
    }

    /// Apply a pub/sub delta: an empty resulting platform list deletes
    /// the entry, otherwise it is stored.
    pub fn apply_delta(&self, delta: &PresenceDelta) {
        let platforms = online_platforms(delta);
        if platforms.is_empty() {
            self.online.remove(&delta.user_id);
        } else {
            self.online.insert(delta.user_id, platforms);
        }
    }

    pub fn is_online(&self, user_id: UserId) -> bool {
        self.online.contains_key(&user_id)
    }

    pub fn online_platforms(&self, user_id: UserId) -> Vec<i32> {
        self.online
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn partition_online_offline(&self, users: &[UserId]) -> (Vec<UserId>, Vec<UserId>) {
        users
            .iter()
            .copied()
            .partition(|user_id| self.is_online(*user_id))
    }
}

impl Default for FullPresenceCache {
    fn default() -> Self {
        Self::new()
    }
}
