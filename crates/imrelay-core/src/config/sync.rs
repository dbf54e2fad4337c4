//! Incremental version sync engine configuration (§4.4).

use serde::{Deserialize, Serialize};

/// Version sync engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum number of log entries fetched per target in one `Versions`
    /// call. The server returns `Full` rather than paginating past this.
    #[serde(default = "default_window_limit")]
    pub window_limit: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            window_limit: default_window_limit(),
        }
    }
}

fn default_window_limit() -> u64 {
    200
}
