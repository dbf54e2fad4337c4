//! Application configuration schemas.
//!
//! Every struct here is deserialized from TOML via the `config` crate.
//! Each sub-module is one logical configuration section, following the
//! same one-section-per-file convention the rest of the corpus uses.

pub mod broker;
pub mod dispatch;
pub mod logging;
pub mod presence;
pub mod sync;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::broker::BrokerConfig;
pub use self::dispatch::{DispatchConfig, PushStrategyKind};
pub use self::logging::LoggingConfig;
pub use self::presence::{PresenceConfig, PresenceMode};
pub use self::sync::SyncConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Broker topic/partition settings.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Online-presence cache settings.
    #[serde(default)]
    pub presence: PresenceConfig,
    /// Incremental version sync settings.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Push dispatcher settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Offline push worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files plus `IMRELAY__`-prefixed
    /// environment variable overrides.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// named after `env` (e.g. `config/production.toml`), both optional.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("IMRELAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
