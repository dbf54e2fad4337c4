//! LRU-mode presence cache: a sharded LRU that caches platform lists on
//! demand, with misses falling back to an RPC (§4.3).

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use imrelay_core::config::PresenceConfig;
use imrelay_core::types::UserId;
use lru::LruCache;

struct Entry {
    platforms: Vec<i32>,
    cached_at: Instant,
}

/// Sharded to avoid a single global lock; each shard is an independent
/// `lru::LruCache` guarded by its own mutex, so concurrent readers only
/// contend within their user's shard.
pub struct LruPresenceCache {
    shards: Vec<Mutex<LruCache<UserId, Entry>>>,
    ttl: Duration,
}

impl LruPresenceCache {
    pub fn new(config: &PresenceConfig) -> Self {
        let capacity = NonZeroUsize::new(config.lru_shard_capacity.max(1)).unwrap();
        let shard_count = config.lru_shard_count.max(1);
        let shards = (0..shard_count)
            .map(|_| Mutex::new(LruCache::new(capacity)))
            .collect();
        Self {
            shards,
            ttl: Duration::from_secs(config.lru_ttl_secs),
        }
    }

    fn shard_index(&self, user_id: UserId) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        use std::hash::{Hash, Hasher};
        user_id.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    fn shard(&self, user_id: UserId) -> &Mutex<LruCache<UserId, Entry>> {
        &self.shards[self.shard_index(user_id)]
    }

    /// Read the cached platform list, treating an expired entry as a miss.
    pub fn get(&self, user_id: UserId) -> Option<Vec<i32>> {
        let mut shard = self.shard(user_id).lock().expect("lru shard mutex poisoned");
        match shard.get(&user_id) {
            Some(entry) if entry.cached_at.elapsed() < self.ttl => Some(entry.platforms.clone()),
            Some(_) => {
                shard.pop(&user_id);
                None
            }
            None => None,
        }
    }

    /// Insert or refresh an entry, e.g. after an RPC fetch on a miss.
    pub fn put(&self, user_id: UserId, platforms: Vec<i32>) {
        let mut shard = self.shard(user_id).lock().expect("lru shard mutex poisoned");
        shard.put(
            user_id,
            Entry {
                platforms,
                cached_at: Instant::now(),
            },
        );
    }

    /// Update an entry only if it is already cached, per the pub/sub
    /// subscriber's `SetIfPresent` contract — a user never seen by an RPC
    /// fetch should not be materialized purely from a presence delta.
    pub fn set_if_present(&self, user_id: UserId, platforms: Vec<i32>) -> bool {
        let mut shard = self.shard(user_id).lock().expect("lru shard mutex poisoned");
        if shard.contains(&user_id) {
            shard.put(
                user_id,
                Entry {
                    platforms,
                    cached_at: Instant::now(),
                },
            );
            true
        } else {
            false
        }
    }

    /// Evict entries past their TTL across all shards. Intended to run on
    /// a periodic sweep (§4.3's "sweep every 3s").
    pub fn sweep_expired(&self) {
        for shard in &self.shards {
            let mut shard = shard.lock().expect("lru shard mutex poisoned");
            let expired: Vec<UserId> = shard
                .iter()
                .filter(|(_, entry)| entry.cached_at.elapsed() >= self.ttl)
                .map(|(user_id, _)| *user_id)
                .collect();
            for user_id in expired {
                shard.pop(&user_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PresenceConfig {
        PresenceConfig {
            mode: imrelay_core::config::PresenceMode::Lru,
            init_retry_attempts: 1,
            init_retry_delay_secs: 0,
            lru_shard_count: 4,
            lru_shard_capacity: 8,
            lru_ttl_secs: 60,
            lru_sweep_interval_secs: 1,
        }
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = LruPresenceCache::new(&test_config());
        let uid = UserId::new();
        cache.put(uid, vec![1, 2]);
        assert_eq!(cache.get(uid), Some(vec![1, 2]));
    }

    #[test]
    fn set_if_present_is_noop_on_miss() {
        let cache = LruPresenceCache::new(&test_config());
        let uid = UserId::new();
        assert!(!cache.set_if_present(uid, vec![1]));
        assert_eq!(cache.get(uid), None);
    }

    #[test]
    fn set_if_present_updates_existing_entry() {
        let cache = LruPresenceCache::new(&test_config());
        let uid = UserId::new();
        cache.put(uid, vec![1]);
        assert!(cache.set_if_present(uid, vec![1, 2]));
        assert_eq!(cache.get(uid), Some(vec![1, 2]));
    }

    #[test]
    fn expired_entry_reads_as_miss() {
        let mut config = test_config();
        config.lru_ttl_secs = 0;
        let cache = LruPresenceCache::new(&config);
        let uid = UserId::new();
        cache.put(uid, vec![1]);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(uid), None);
    }
}
