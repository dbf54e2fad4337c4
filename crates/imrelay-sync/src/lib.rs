//! # imrelay-sync
//!
//! The incremental version sync engine (§4.4): bidirectional
//! reconciliation of an opaque per-owner collection against an opaque
//! version cursor, without transferring unchanged items.

pub mod engine;
pub mod log;
pub mod traits;
pub mod version_id;

pub use engine::{
    extract_delta, sync_batch, sync_single, BatchSyncResponse, BatchTarget, DeltaIds, SyncResponse, Tag,
};
pub use log::{ChangeRecord, LatestVersion, OpType, VersionLog};
pub use traits::VersionSource;
pub use version_id::VersionId;
