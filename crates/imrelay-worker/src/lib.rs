//! # imrelay-worker
//!
//! The offline push worker (§4.5): consumes the `to-offline-push` queue,
//! invokes the vendor push adapter, and hosts the presence-cache
//! maintenance sweep and init-phase health check.

pub mod jobs;
pub mod runner;

pub use jobs::OfflinePushHandler;
pub use runner::WorkerRunner;
