//! The version-sync RPC contract (§6 External Interfaces).
//!
//! No production implementation lives here — the document store and the
//! cache-of-latest-version lookup are non-goals (§1); this trait is the
//! seam an entity family's store adapter plugs into. Generic over the
//! entity payload type so each family gets a strongly typed source,
//! mirroring the corpus's generic repository trait.

use async_trait::async_trait;
use imrelay_core::AppResult;

use crate::log::{LatestVersion, VersionLog};
use crate::version_id::VersionId;

#[async_trait]
pub trait VersionSource<Entity>: Send + Sync + 'static
where
    Entity: Send + Sync + 'static,
{
    /// A cache-of-latest-version lookup, if this deployment has one
    /// configured. Returning `Ok(None)` means no such cache exists for
    /// this target, not that the target has no data.
    async fn cache_latest(&self, version_key: &str) -> AppResult<Option<LatestVersion>>;

    /// Fetch a version log starting after `from`, bounded to `limit`
    /// entries. `limit == 0` means "no bound", used for a full dump.
    async fn versions(&self, version_key: &str, from: u64, limit: u64) -> AppResult<VersionLog>;

    /// Batched entity fetch by id, called once for inserts and once for
    /// updates.
    async fn find(&self, version_key: &str, ids: &[String]) -> AppResult<Vec<Entity>>;
}
