//! # imrelay-core
//!
//! Shared foundation for the imrelay message delivery and synchronization
//! core:
//!
//! - Unified error handling (§7 of the spec's error taxonomy)
//! - Configuration schemas for every tunable subsystem
//! - Newtype identifiers shared across crates
//! - Traits for external collaborators: the offline-push vendor, the
//!   gateway's online-push RPC, the webhook interceptor, and the broker

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
