//! The presence backing store's RPC contract.
//!
//! Neither the paginated online-user scan nor the per-user platform
//! fetch has a production implementation here — both are external
//! collaborators the spec excludes as non-goals (persistent stores are
//! contracts only, §1). This trait is the seam a deployment's presence
//! service client plugs into.

use async_trait::async_trait;
use imrelay_core::types::UserId;
use imrelay_core::AppResult;

/// One page of the full-mode online-user scan.
#[derive(Debug, Clone, Default)]
pub struct OnlineUsersPage {
    pub users: Vec<(UserId, Vec<i32>)>,
    /// Opaque cursor for the next page; `None` means this was the last page.
    pub next_cursor: Option<String>,
}

#[async_trait]
pub trait PresenceSource: Send + Sync + std::fmt::Debug + 'static {
    /// One page of `GetAllOnlineUsers`, used to seed full mode on start.
    async fn scan_online_users(&self, cursor: Option<&str>) -> AppResult<OnlineUsersPage>;

    /// Fetch current platforms for a batch of users, used on an LRU miss.
    async fn fetch_platforms(&self, user_ids: &[UserId]) -> AppResult<Vec<(UserId, Vec<i32>)>>;
}
