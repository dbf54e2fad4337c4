//! Worker job loops (§4.5).

pub mod health_check;
pub mod offline_push;
pub mod presence_sweep;

pub use offline_push::OfflinePushHandler;
