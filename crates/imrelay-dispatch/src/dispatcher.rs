//! `Dispatch(msg)` (§4.2): consumes a message from the `to-push` queue,
//! delivers it online, and schedules offline fan-out for the remainder.

use std::sync::Arc;

use imrelay_core::traits::{GatewayPush, HookOutcome, HookPoint, OnlinePushResult};
use imrelay_core::types::{GroupId, UserId};
use imrelay_core::AppResult;
use imrelay_message::{ContentType, Message, OfflinePushInfo, Recv, SessionType};
use imrelay_presence::PresenceCache;
use serde::{Deserialize, Serialize};

use crate::group::{filter_do_not_disturb, GroupMembershipSource};
use crate::hook::HookInvoker;
use crate::queue::OfflinePushQueue;
use crate::strategy::OnlinePushStrategy;

#[derive(Serialize)]
struct OnlinePushPayload<'a> {
    msg: &'a Message,
    targets: &'a [UserId],
}

/// Rewritable payload for the `beforeOfflinePush` hook: the callback may
/// shrink/replace the user list or override the push text (§4.2 step 6).
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OfflinePushDecision {
    offline_user_ids: Vec<UserId>,
    offline_push_info: Option<OfflinePushInfo>,
}

/// Push dispatcher: owns the online-push strategy, the presence-cache
/// pre-filter, webhook wiring, group membership, and the offline-push
/// queue a deployment needs to run `Dispatch(msg)` per §4.2.
#[derive(Debug)]
pub struct Dispatcher {
    presence: Arc<PresenceCache>,
    strategy: Arc<dyn OnlinePushStrategy>,
    hooks: HookInvoker,
    groups: Arc<dyn GroupMembershipSource>,
    queue: Arc<OfflinePushQueue>,
}

impl Dispatcher {
    pub fn new(
        presence: Arc<PresenceCache>,
        strategy: Arc<dyn OnlinePushStrategy>,
        hooks: HookInvoker,
        groups: Arc<dyn GroupMembershipSource>,
        queue: Arc<OfflinePushQueue>,
    ) -> Self {
        Self {
            presence,
            strategy,
            hooks,
            groups,
            queue,
        }
    }

    /// `Dispatch(msg)`.
    pub async fn dispatch(&self, msg: Message) -> AppResult<()> {
        match msg.recv {
            Recv::Group(group_id) => self.dispatch_group(msg, group_id).await,
            Recv::User(_) => self.dispatch_single(msg).await,
        }
    }

    /// Single / Notification branch (§4.2).
    async fn dispatch_single(&self, mut msg: Message) -> AppResult<()> {
        let Recv::User(recv) = msg.recv else {
            unreachable!("dispatch_single only called for user recipients");
        };

        let mut targets = vec![recv];
        if msg.options.get(imrelay_message::OptionKey::IsSenderSync) && msg.sender != recv {
            targets.push(msg.sender);
        }

        let attention_id = msg.conversation_id().to_string();
        if let Some(HookOutcome::Reject(reason)) = self
            .hooks
            .before(
                HookPoint::BeforeOnlinePush,
                msg.content_type.0,
                &attention_id,
                &OnlinePushPayload { msg: &msg, targets: &targets },
            )
            .await?
        {
            tracing::info!(reason, "beforeOnlinePush rejected dispatch");
            return Ok(());
        }

        let results = self.get_conns_and_online_push(&msg, &targets).await?;

        if !msg.should_push_offline() {
            return Ok(());
        }

        let offline_candidates = offline_targets(&results, msg.sender);
        if offline_candidates.is_empty() {
            return Ok(());
        }

        let decision = OfflinePushDecision {
            offline_user_ids: offline_candidates,
            offline_push_info: msg.offline_push_info.clone(),
        };
        let decision = match self
            .hooks
            .before(HookPoint::BeforeOfflinePush, msg.content_type.0, &attention_id, &decision)
            .await?
        {
            Some(HookOutcome::Reject(reason)) => {
                tracing::info!(reason, "beforeOfflinePush rejected offline fan-out");
                return Ok(());
            }
            Some(HookOutcome::Continue(bytes)) => {
                serde_json::from_slice(&bytes).unwrap_or(decision)
            }
            None => decision,
        };

        if let Some(info) = decision.offline_push_info {
            msg.offline_push_info = Some(info);
        }
        let partition_key = msg.conversation_id().to_string();
        self.queue.enqueue(partition_key, msg, decision.offline_user_ids).await;
        Ok(())
    }

    /// Group branch (§4.2).
    async fn dispatch_group(&self, mut msg: Message, group_id: GroupId) -> AppResult<()> {
        let attention_id = msg.conversation_id().to_string();

        let mut push_to_user_ids = match self
            .hooks
            .before(
                HookPoint::BeforeGroupOnlinePush,
                msg.content_type.0,
                &attention_id,
                &Vec::<UserId>::new(),
            )
            .await?
        {
            Some(HookOutcome::Reject(reason)) => {
                tracing::info!(reason, "beforeGroupOnlinePush rejected dispatch");
                return Ok(());
            }
            Some(HookOutcome::Continue(bytes)) => serde_json::from_slice(&bytes).unwrap_or_default(),
            None => Vec::new(),
        };

        if push_to_user_ids.is_empty() {
            push_to_user_ids = self.groups.members(group_id).await?;
        }
        if msg.content_type.is_membership_changing_notification() {
            for &affected in &msg.at_user_ids {
                if !push_to_user_ids.contains(&affected) {
                    push_to_user_ids.push(affected);
                }
            }
            if msg.content_type == ContentType::GROUP_DISMISSED {
                if let Err(err) = self.groups.cleanup_dismissed_group(group_id).await {
                    tracing::warn!(error = %err, "group dismissal cleanup failed");
                }
            }
        }

        let results = self.get_conns_and_online_push(&msg, &push_to_user_ids).await?;

        if !msg.should_push_offline() {
            return Ok(());
        }

        let offline_candidates = offline_targets(&results, msg.sender);
        let offline_candidates = filter_do_not_disturb(
            offline_candidates,
            &self.groups.do_not_disturb(group_id, &push_to_user_ids).await?,
        );
        if offline_candidates.is_empty() {
            return Ok(());
        }

        let decision = OfflinePushDecision {
            offline_user_ids: offline_candidates,
            offline_push_info: msg.offline_push_info.clone(),
        };
        let decision = match self
            .hooks
            .before(HookPoint::BeforeOfflinePush, msg.content_type.0, &attention_id, &decision)
            .await?
        {
            Some(HookOutcome::Reject(reason)) => {
                tracing::info!(reason, "beforeOfflinePush rejected offline fan-out");
                return Ok(());
            }
            Some(HookOutcome::Continue(bytes)) => {
                serde_json::from_slice(&bytes).unwrap_or(decision)
            }
            None => decision,
        };

        if let Some(info) = decision.offline_push_info {
            msg.offline_push_info = Some(info);
        }
        let partition_key = msg.conversation_id().to_string();
        let queue = Arc::clone(&self.queue);
        tokio::spawn(async move {
            queue.enqueue(partition_key, msg, decision.offline_user_ids).await;
        });
        Ok(())
    }

    /// `GetConnsAndOnlinePush(msg, targets)` (§4.3): the presence cache
    /// prunes targets already known offline, then the online-push
    /// strategy is the authority for whatever remains.
    async fn get_conns_and_online_push(&self, msg: &Message, targets: &[UserId]) -> AppResult<Vec<OnlinePushResult>> {
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        let (candidates, known_offline) = self.presence.partition_online_offline(targets).await?;

        let mut results = if candidates.is_empty() {
            Vec::new()
        } else {
            let payload = serde_json::to_vec(msg)?;
            self.strategy.push(&payload, &candidates).await?
        };
        for user_id in known_offline {
            results.push(OnlinePushResult {
                user_id,
                online_push: false,
                platform_id: None,
                error: None,
            });
        }

        // A gateway instance may ignore a user it isn't connected to
        // (§6), so fan-out-all's merge can leave a `candidates` entry out
        // of `results` entirely. Treat any target absent from the merged
        // results the same as an explicit `online_push: false`, so the
        // offline set is the full set-difference across every target
        // rather than only the ones a strategy bothered to mention.
        for &user_id in targets {
            if !results.iter().any(|r| r.user_id == user_id) {
                results.push(OnlinePushResult {
                    user_id,
                    online_push: false,
                    platform_id: None,
                    error: None,
                });
            }
        }

        Ok(results)
    }
}

/// Every target whose push result reports `online_push == false`,
/// excluding `sender`. The full target set is always evaluated; there is
/// no early return on the first successful push (§9 open question,
/// resolved).
fn offline_targets(results: &[OnlinePushResult], sender: UserId) -> Vec<UserId> {
    results
        .iter()
        .filter(|r| !r.online_push && r.user_id != sender)
        .map(|r| r.user_id)
        .collect()
}
