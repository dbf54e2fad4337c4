//! Push-side collaborator traits: gateway online-push RPC and the
//! offline-push vendor interface (§6 External Interfaces).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::UserId;

/// One gateway's verdict on pushing a message to a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlinePushResult {
    pub user_id: UserId,
    /// Whether this gateway instance held a live connection and delivered it.
    pub online_push: bool,
    pub platform_id: Option<i32>,
    pub error: Option<String>,
}

/// The gateway's online-push RPC, named after the wire call it fronts
/// (`SuperGroupOnlineBatchPushOneMsg`). Implementations MAY ignore users
/// not connected to them; a user absent from the result vector is treated
/// the same as `online_push: false`.
#[async_trait]
pub trait GatewayPush: Send + Sync + std::fmt::Debug + 'static {
    async fn push_to_users(
        &self,
        payload: &[u8],
        user_ids: &[UserId],
    ) -> AppResult<Vec<OnlinePushResult>>;
}

/// Options accompanying an offline-push vendor call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfflinePushOptions {
    /// Opaque client message id, surfaced to the vendor as a signal payload.
    pub signal_client_msg_id: Option<String>,
    pub ios_push_sound: Option<String>,
    pub ios_badge_count: Option<i32>,
    pub ex: Option<String>,
}

/// Third-party offline-push vendor interface. Errors are reported to the
/// caller, never retried — the broker's at-least-once delivery already
/// gave the message one chance.
#[async_trait]
pub trait OfflinePusher: Send + Sync + std::fmt::Debug + 'static {
    async fn push(
        &self,
        user_ids: &[UserId],
        title: &str,
        content: &str,
        opts: &OfflinePushOptions,
    ) -> AppResult<()>;
}
