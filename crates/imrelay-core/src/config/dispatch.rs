//! Push dispatcher configuration (§4.2, §5).

use serde::{Deserialize, Serialize};

/// Which online-push strategy a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushStrategyKind {
    /// Broadcast to every gateway instance in parallel.
    FanOutAll,
    /// Consistent-hash users to their owning gateway host.
    ConsistentHash,
    /// No gateway instances are reachable; everyone is offline-capable.
    Empty,
}

/// Push dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Which online-push strategy to use.
    #[serde(default = "default_strategy")]
    pub strategy: PushStrategyKind,
    /// Maximum concurrent gateway RPC workers during fan-out (floor 3).
    #[serde(default = "default_max_concurrent_workers")]
    pub max_concurrent_workers: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            max_concurrent_workers: default_max_concurrent_workers(),
        }
    }
}

impl DispatchConfig {
    /// Effective worker concurrency, enforcing the floor of 3 from §5.
    pub fn effective_max_concurrent_workers(&self) -> usize {
        self.max_concurrent_workers.max(3)
    }
}

fn default_strategy() -> PushStrategyKind {
    PushStrategyKind::FanOutAll
}

fn default_max_concurrent_workers() -> usize {
    8
}
