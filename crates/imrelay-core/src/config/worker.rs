//! Offline push worker configuration (§4.5).

use serde::{Deserialize, Serialize};

/// Offline push worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the offline push worker loop is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Presence-cache maintenance sweep interval in seconds.
    #[serde(default = "default_presence_sweep_interval_secs")]
    pub presence_sweep_interval_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            presence_sweep_interval_secs: default_presence_sweep_interval_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_presence_sweep_interval_secs() -> u64 {
    3
}
