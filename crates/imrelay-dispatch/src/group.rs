//! Group membership and do-not-disturb lookups for the group dispatch
//! branch (§4.2).

use async_trait::async_trait;
use imrelay_core::types::{GroupId, UserId};
use imrelay_core::AppResult;

/// External collaborator resolving group membership, conversation-level
/// do-not-disturb state, and dismissal cleanup. No production
/// implementation lives here; persistent store implementations are a
/// non-goal (§1). This is the seam a deployment's group-service client
/// plugs into.
#[async_trait]
pub trait GroupMembershipSource: Send + Sync + std::fmt::Debug + 'static {
    async fn members(&self, group_id: GroupId) -> AppResult<Vec<UserId>>;

    /// Which of `candidates` have muted this group conversation.
    async fn do_not_disturb(&self, group_id: GroupId, candidates: &[UserId]) -> AppResult<Vec<UserId>>;

    /// Invoked once, after a `GroupDismissed` notification has been built
    /// for push. Best-effort: failures are logged, not propagated.
    async fn cleanup_dismissed_group(&self, group_id: GroupId) -> AppResult<()>;
}

/// Remove every user in `do_not_disturb` from `candidates`.
pub fn filter_do_not_disturb(candidates: Vec<UserId>, do_not_disturb: &[UserId]) -> Vec<UserId> {
    candidates.into_iter().filter(|u| !do_not_disturb.contains(u)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_removes_muted_users() {
        let a = UserId::new();
        let b = UserId::new();
        let c = UserId::new();
        let filtered = filter_do_not_disturb(vec![a, b, c], &[b]);
        assert_eq!(filtered, vec![a, c]);
    }
}
