//! # imrelay-presence
//!
//! The online-presence cache (§4.3): a process-local view of which
//! platforms each user is connected on, kept fresh by a pub/sub
//! subscriber and exposed through a mode-agnostic read API gated by a
//! phased initialization condition variable.

pub mod bridge;
pub mod cache;
pub mod full;
pub mod lru;
pub mod phase;
pub mod protocol;
pub mod source;
pub mod subscriber;

pub use cache::PresenceCache;
pub use phase::{Phase, PresencePhase};
pub use protocol::{online_platforms, parse, PlatformState, PresenceDelta};
pub use source::{OnlineUsersPage, PresenceSource};
