//! Version logs and change records (§3, §4.4).

use serde::{Deserialize, Serialize};

use crate::version_id::VersionId;

/// The kind of change a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpType {
    Insert,
    Update,
    Delete,
    /// A change to this entity's sort position, carried out-of-band from
    /// the insert/update/delete sets (§4.4's "sort-change record").
    SortChange,
}

/// One entry in a version log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub eid: String,
    pub op: OpType,
    pub version: u64,
}

/// A fetched version log for one `(versionKey, entity-family)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionLog {
    pub id: VersionId,
    pub version: u64,
    pub logs: Vec<ChangeRecord>,
    /// The log's length before any compaction, used to detect truncation.
    pub log_len: u64,
}

/// The server's current `(id, version)` pointer, as returned by a
/// cache-of-latest-version lookup without fetching the full log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestVersion {
    pub id: VersionId,
    pub version: u64,
}
