//! Online-presence cache configuration (§4.3).

use serde::{Deserialize, Serialize};

/// Which presence-cache mode a deployment runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceMode {
    /// A concurrent map with an entry for every online user.
    Full,
    /// A sharded LRU that caches platform lists on demand.
    Lru,
}

/// Online-presence cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Cache mode.
    #[serde(default = "default_mode")]
    pub mode: PresenceMode,
    /// Full-mode init: max retry attempts on a transient scan error.
    #[serde(default = "default_init_retries")]
    pub init_retry_attempts: u32,
    /// Full-mode init: delay between retries, in seconds.
    #[serde(default = "default_init_retry_delay_secs")]
    pub init_retry_delay_secs: u64,
    /// LRU mode: number of shards.
    #[serde(default = "default_lru_shards")]
    pub lru_shard_count: usize,
    /// LRU mode: per-shard entry capacity.
    #[serde(default = "default_lru_shard_capacity")]
    pub lru_shard_capacity: usize,
    /// LRU mode: entry TTL in seconds (half the server-side online expiry
    /// by convention).
    #[serde(default = "default_lru_ttl_secs")]
    pub lru_ttl_secs: u64,
    /// LRU mode: TTL sweep interval in seconds.
    #[serde(default = "default_lru_sweep_interval_secs")]
    pub lru_sweep_interval_secs: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            init_retry_attempts: default_init_retries(),
            init_retry_delay_secs: default_init_retry_delay_secs(),
            lru_shard_count: default_lru_shards(),
            lru_shard_capacity: default_lru_shard_capacity(),
            lru_ttl_secs: default_lru_ttl_secs(),
            lru_sweep_interval_secs: default_lru_sweep_interval_secs(),
        }
    }
}

fn default_mode() -> PresenceMode {
    PresenceMode::Full
}

fn default_init_retries() -> u32 {
    5
}

fn default_init_retry_delay_secs() -> u64 {
    5
}

fn default_lru_shards() -> usize {
    1024
}

fn default_lru_shard_capacity() -> usize {
    2048
}

fn default_lru_ttl_secs() -> u64 {
    150
}

fn default_lru_sweep_interval_secs() -> u64 {
    3
}
