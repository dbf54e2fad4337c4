//! The message type and its canonicalization operations (§3, §4.1).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::Utc;
use imrelay_core::types::{GroupId, MsgId, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content_type::ContentType;
use crate::conversation::{ConversationId, SessionType};
use crate::options::{MsgOptions, OptionKey};

/// Message delivery status. The dispatcher promotes `Sending` to
/// `SendSuccess` on intake (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsgStatus {
    Sending,
    SendSuccess,
}

/// Who a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recv {
    User(UserId),
    Group(GroupId),
}

/// Offline-push hints carried on the message, used verbatim by the
/// offline push worker when present (§4.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfflinePushInfo {
    pub title: String,
    pub desc: String,
    pub ex: String,
    pub ios_badge_count: Option<i32>,
    pub ios_push_sound: Option<String>,
}

impl OfflinePushInfo {
    pub fn is_present(&self) -> bool {
        !self.title.is_empty() || !self.desc.is_empty()
    }
}

/// A single message moving through the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub server_msg_id: MsgId,
    pub client_msg_id: String,
    pub sender: UserId,
    pub recv: Recv,
    pub session_type: SessionType,
    pub content_type: ContentType,
    pub content: Vec<u8>,
    /// Send time in epoch milliseconds.
    pub send_time: i64,
    /// Monotonic sequence number per conversation.
    pub seq: u64,
    pub at_user_ids: Vec<UserId>,
    pub offline_push_info: Option<OfflinePushInfo>,
    pub options: MsgOptions,
    pub status: MsgStatus,
}

impl Message {
    /// Canonicalize a freshly-received message: assign `ServerMsgID`,
    /// default `SendTime`, force `IsSenderSync`, and apply content-type
    /// forcing rules (§4.1).
    ///
    /// `server_msg_id` and `send_time` are only assigned if not already
    /// set (`server_msg_id` is nil, `send_time` is zero), matching
    /// "`SendTime` set if zero".
    pub fn encapsulate(mut self) -> Self {
        if self.server_msg_id == MsgId::from_uuid(Uuid::nil()) {
            self.server_msg_id = generate_server_msg_id(self.sender, self.send_time);
        }
        if self.send_time == 0 {
            self.send_time = Utc::now().timestamp_millis();
        }
        self.options.set(OptionKey::IsSenderSync, true);
        self.apply_content_type_forcing();
        if self.status == MsgStatus::Sending {
            self.status = MsgStatus::SendSuccess;
        }
        self
    }

    fn apply_content_type_forcing(&mut self) {
        if self.content_type == ContentType::REVOKE {
            self.options.set(OptionKey::IsUnreadCount, false);
            self.options.set(OptionKey::IsOfflinePush, false);
        }
        if self.content_type == ContentType::READ_RECEIPT {
            self.options.set(OptionKey::IsUnreadCount, false);
            self.options.set(OptionKey::IsOfflinePush, false);
            self.options.set(OptionKey::IsConversationUpdate, false);
            self.options.set(OptionKey::IsSenderConversationUpdate, false);
        }
        if self.content_type == ContentType::TYPING {
            self.options.set(OptionKey::IsUnreadCount, false);
            self.options.set(OptionKey::IsOfflinePush, false);
            self.options.set(OptionKey::IsConversationUpdate, false);
            self.options.set(OptionKey::IsSenderConversationUpdate, false);
            self.options.set(OptionKey::IsHistory, false);
            self.options.set(OptionKey::IsPersistent, false);
            self.options.set(OptionKey::IsSenderSync, false);
        }
    }

    /// `ConversationID(msg)` (§4.1).
    pub fn conversation_id(&self) -> ConversationId {
        match (self.session_type, self.recv) {
            (SessionType::Single, Recv::User(recv)) => ConversationId::single(self.sender, recv),
            (SessionType::Group, Recv::Group(group)) => ConversationId::group(group),
            (SessionType::Notification, Recv::User(recv)) => ConversationId::notification(recv),
            _ => ConversationId::notification(self.sender),
        }
    }

    /// `ShouldPushOffline(msg)` (§4.1).
    pub fn should_push_offline(&self) -> bool {
        self.options.get(OptionKey::IsOfflinePush)
            && !matches!(
                self.content_type,
                ContentType::ROOM_PARTICIPANTS_CONNECTED | ContentType::ROOM_PARTICIPANTS_DISCONNECTED
            )
    }
}

/// Assign a server message id: a hash over the send timestamp, the
/// sender, and a random nonce, matching §4.1's "hash of
/// timestamp+sender+random".
fn generate_server_msg_id(sender: UserId, send_time: i64) -> MsgId {
    let nonce = Uuid::new_v4().as_u128();

    let mut lo_hasher = DefaultHasher::new();
    send_time.hash(&mut lo_hasher);
    sender.hash(&mut lo_hasher);
    nonce.hash(&mut lo_hasher);
    let lo = lo_hasher.finish();

    let mut hi_hasher = DefaultHasher::new();
    nonce.hash(&mut hi_hasher);
    send_time.hash(&mut hi_hasher);
    let hi = hi_hasher.finish();

    let mut bytes = [0u8; 16];
    bytes[..8].copy_from_slice(&lo.to_be_bytes());
    bytes[8..].copy_from_slice(&hi.to_be_bytes());
    MsgId::from_uuid(Uuid::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_message(content_type: ContentType) -> Message {
        Message {
            server_msg_id: MsgId::from_uuid(Uuid::nil()),
            client_msg_id: "client-1".to_string(),
            sender: UserId::new(),
            recv: Recv::User(UserId::new()),
            session_type: SessionType::Single,
            content_type,
            content: b"hello".to_vec(),
            send_time: 0,
            seq: 1,
            at_user_ids: Vec::new(),
            offline_push_info: None,
            options: MsgOptions::new(),
            status: MsgStatus::Sending,
        }
    }

    #[test]
    fn encapsulate_assigns_server_msg_id_and_send_time() {
        let msg = base_message(ContentType::TEXT).encapsulate();
        assert_ne!(msg.server_msg_id, MsgId::from_uuid(Uuid::nil()));
        assert!(msg.send_time > 0);
        assert_eq!(msg.status, MsgStatus::SendSuccess);
        assert!(msg.options.get(OptionKey::IsSenderSync));
    }

    #[test]
    fn revoke_forces_unread_and_offline_push_off() {
        let msg = base_message(ContentType::REVOKE).encapsulate();
        assert!(!msg.options.get(OptionKey::IsUnreadCount));
        assert!(!msg.options.get(OptionKey::IsOfflinePush));
    }

    #[test]
    fn read_receipt_forces_conversation_update_off() {
        let msg = base_message(ContentType::READ_RECEIPT).encapsulate();
        assert!(!msg.options.get(OptionKey::IsConversationUpdate));
        assert!(!msg.options.get(OptionKey::IsSenderConversationUpdate));
    }

    #[test]
    fn typing_forces_sender_sync_off_even_though_set_true_earlier() {
        let msg = base_message(ContentType::TYPING).encapsulate();
        assert!(!msg.options.get(OptionKey::IsHistory));
        assert!(!msg.options.get(OptionKey::IsPersistent));
        assert!(!msg.options.get(OptionKey::IsSenderSync));
    }

    #[test]
    fn should_push_offline_excludes_room_participant_events() {
        let mut msg = base_message(ContentType::ROOM_PARTICIPANTS_CONNECTED);
        msg.options.set(OptionKey::IsOfflinePush, true);
        assert!(!msg.should_push_offline());

        let mut msg = base_message(ContentType::TEXT);
        msg.options.set(OptionKey::IsOfflinePush, true);
        assert!(msg.should_push_offline());
    }
}
