//! The presence cache's unified read API (§4.3), dispatching to whichever
//! mode a deployment is configured for.

use std::collections::HashMap;
use std::sync::Arc;

use imrelay_core::config::PresenceConfig;
use imrelay_core::types::UserId;
use imrelay_core::AppResult;

use crate::full::FullPresenceCache;
use crate::lru::LruPresenceCache;
use crate::phase::{Phase, PresencePhase};
use crate::protocol::{online_platforms, PresenceDelta};
use crate::source::PresenceSource;

/// The process-local presence cache. Construct via [`PresenceCache::full`]
/// or [`PresenceCache::lru`]; either way, wait on the returned
/// [`PresencePhase`] before reading.
pub enum PresenceCache {
    Full(FullPresenceCache),
    Lru {
        cache: LruPresenceCache,
        source: Arc<dyn PresenceSource>,
    },
}

impl PresenceCache {
    /// Build a full-mode cache: run the paginated online-user scan to
    /// completion, then advance the phase to `DoOnlineStatusOver`. The
    /// caller still owes a final `advance_to(DoSubscribeOver)` once the
    /// pub/sub subscriber has drained its buffered messages.
    pub async fn full(
        source: Arc<dyn PresenceSource>,
        config: &PresenceConfig,
        phase: &Arc<PresencePhase>,
    ) -> AppResult<Self> {
        let cache = FullPresenceCache::new();
        cache.init(&source, config).await?;
        phase.advance_to(Phase::DoOnlineStatusOver);
        Ok(Self::Full(cache))
    }

    /// Build an LRU-mode cache. LRU mode has no scan to run, so the
    /// caller should advance the phase directly to `DoSubscribeOver`.
    pub fn lru(source: Arc<dyn PresenceSource>, config: &PresenceConfig) -> Self {
        Self::Lru {
            cache: LruPresenceCache::new(config),
            source,
        }
    }

    /// Apply a presence pub/sub delta.
    ///
    /// Full mode stores or deletes per the resulting platform list; LRU
    /// mode only updates an entry that is already cached
    /// (`set_if_present`), never materializing a new one from a delta
    /// alone.
    pub fn apply_delta(&self, delta: &PresenceDelta) {
        match self {
            Self::Full(cache) => cache.apply_delta(delta),
            Self::Lru { cache, .. } => {
                cache.set_if_present(delta.user_id, online_platforms(delta));
            }
        }
    }

    /// `OnlinePlatforms(user)`.
    pub async fn online_platforms(&self, user_id: UserId) -> AppResult<Vec<i32>> {
        match self {
            Self::Full(cache) => Ok(cache.online_platforms(user_id)),
            Self::Lru { cache, source } => {
                if let Some(platforms) = cache.get(user_id) {
                    return Ok(platforms);
                }
                let fetched = source.fetch_platforms(&[user_id]).await?;
                let platforms = fetched
                    .into_iter()
                    .find(|(uid, _)| *uid == user_id)
                    .map(|(_, platforms)| platforms)
                    .unwrap_or_default();
                cache.put(user_id, platforms.clone());
                Ok(platforms)
            }
        }
    }

    /// `IsOnline(user)`.
    pub async fn is_online(&self, user_id: UserId) -> AppResult<bool> {
        Ok(!self.online_platforms(user_id).await?.is_empty())
    }

    /// `GetUsersOnline(users) / PartitionOnlineOffline(users)`. The
    /// returned slices together cover exactly the input set.
    pub async fn partition_online_offline(&self, users: &[UserId]) -> AppResult<(Vec<UserId>, Vec<UserId>)> {
        match self {
            Self::Full(cache) => Ok(cache.partition_online_offline(users)),
            Self::Lru { cache, source } => {
                let mut online = Vec::new();
                let mut offline = Vec::new();
                let mut missing = Vec::new();

                for &user_id in users {
                    match cache.get(user_id) {
                        Some(platforms) if !platforms.is_empty() => online.push(user_id),
                        Some(_) => offline.push(user_id),
                        None => missing.push(user_id),
                    }
                }

                if !missing.is_empty() {
                    let fetched: HashMap<UserId, Vec<i32>> =
                        source.fetch_platforms(&missing).await?.into_iter().collect();
                    for user_id in missing {
                        let platforms = fetched.get(&user_id).cloned().unwrap_or_default();
                        cache.put(user_id, platforms.clone());
                        if platforms.is_empty() {
                            offline.push(user_id);
                        } else {
                            online.push(user_id);
                        }
                    }
                }

                Ok((online, offline))
            }
        }
    }

    /// Run the LRU TTL sweep. A no-op in full mode, which has no TTL.
    pub fn sweep_expired(&self) {
        if let Self::Lru { cache, .. } = self {
            cache.sweep_expired();
        }
    }
}

impl std::fmt::Debug for PresenceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(_) => f.write_str("PresenceCache::Full"),
            Self::Lru { .. } => f.write_str("PresenceCache::Lru"),
        }
    }
}
