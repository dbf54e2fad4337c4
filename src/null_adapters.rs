//! Null-object adapters for external collaborators nothing is configured
//! for.
//!
//! `imrelay-core`'s traits (`PresenceSource`, `GroupMembershipSource`,
//! `OfflinePusher`, `GatewayPush`) are seams for a deployment's own
//! presence store, group service, push vendor, and gateway fleet; none has
//! a production implementation in this workspace. These null adapters are
//! what the binary plugs in when no such collaborator is configured,
//! mirroring the `DispatchConfig::PushStrategyKind::Empty` variant the
//! dispatcher already treats as "nobody is reachable, everyone is
//! offline-capable."

use async_trait::async_trait;

use imrelay_core::error::AppError;
use imrelay_core::types::{GroupId, UserId};
use imrelay_core::AppResult;
use imrelay_dispatch::GroupMembershipSource;
use imrelay_presence::source::PresenceSource;
use imrelay_presence::OnlineUsersPage;

/// A presence source with nobody in it. Full mode boots with an empty
/// online-user set; LRU mode's on-miss fetch always comes back empty.
#[derive(Debug, Default)]
pub struct NullPresenceSource;

#[async_trait]
impl PresenceSource for NullPresenceSource {
    async fn scan_online_users(&self, _cursor: Option<&str>) -> AppResult<OnlineUsersPage> {
        Ok(OnlineUsersPage::default())
    }

    async fn fetch_platforms(&self, _user_ids: &[UserId]) -> AppResult<Vec<(UserId, Vec<i32>)>> {
        Ok(Vec::new())
    }
}

/// A group service with no groups in it: every group is reported empty,
/// nobody is muted, and dismissal cleanup is a no-op.
#[derive(Debug, Default)]
pub struct NullGroupMembershipSource;

#[async_trait]
impl GroupMembershipSource for NullGroupMembershipSource {
    async fn members(&self, _group_id: GroupId) -> AppResult<Vec<UserId>> {
        Ok(Vec::new())
    }

    async fn do_not_disturb(&self, _group_id: GroupId, _candidates: &[UserId]) -> AppResult<Vec<UserId>> {
        Ok(Vec::new())
    }

    async fn cleanup_dismissed_group(&self, _group_id: GroupId) -> AppResult<()> {
        Ok(())
    }
}

/// An offline-push vendor adapter that isn't wired to anything. Every call
/// fails with a configuration error, which the worker already counts and
/// logs rather than retrying (§4.5).
#[derive(Debug, Default)]
pub struct NullOfflinePusher;

#[async_trait]
impl imrelay_core::traits::OfflinePusher for NullOfflinePusher {
    async fn push(
        &self,
        _user_ids: &[UserId],
        _title: &str,
        _content: &str,
        _opts: &imrelay_core::traits::OfflinePushOptions,
    ) -> AppResult<()> {
        Err(AppError::configuration("no offline push vendor configured"))
    }
}
