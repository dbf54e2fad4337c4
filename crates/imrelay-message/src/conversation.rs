//! Conversation ID derivation (§3, §4.1).

use imrelay_core::types::{GroupId, UserId};
use serde::{Deserialize, Serialize};

use crate::content_type::ContentType;

/// The kind of conversation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionType {
    /// `recv` is a user.
    Single,
    /// `recv` is a group.
    Group,
    /// Server-generated notification, `recv` is a user.
    Notification,
}

impl SessionType {
    /// Classify from content type and whether the target is a group,
    /// matching `Classify(msg)` in §4.1.
    pub fn classify(content_type: ContentType, group_id: Option<GroupId>) -> Self {
        if content_type.is_notification() {
            Self::Notification
        } else if group_id.is_some() {
            Self::Group
        } else {
            Self::Single
        }
    }
}

/// An opaque, deterministically-derived conversation identifier. Both
/// peers of a single chat compute the same ID regardless of who is
/// sending, because the pair of user ids is sorted before formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    /// `si_<sorted(sender,recv)>` for a single chat.
    pub fn single(sender: UserId, recv: UserId) -> Self {
        let (a, b) = if sender.to_string() <= recv.to_string() {
            (sender, recv)
        } else {
            (recv, sender)
        };
        Self(format!("si_{a}_{b}"))
    }

    /// `sg_<groupID>` for a group conversation.
    pub fn group(group_id: GroupId) -> Self {
        Self(format!("sg_{group_id}"))
    }

    /// `n_<recv>` for a notification addressed to a single user.
    pub fn notification(recv: UserId) -> Self {
        Self(format!("n_{recv}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chat_id_is_symmetric() {
        let a = UserId::new();
        let b = UserId::new();
        assert_eq!(ConversationId::single(a, b), ConversationId::single(b, a));
    }

    #[test]
    fn group_id_uses_group_prefix() {
        let g = GroupId::new();
        assert!(ConversationId::group(g).as_str().starts_with("sg_"));
    }

    #[test]
    fn classify_detects_notification_range() {
        assert_eq!(
            SessionType::classify(ContentType::MEMBER_QUIT, None),
            SessionType::Notification
        );
        assert_eq!(
            SessionType::classify(ContentType::TEXT, Some(GroupId::new())),
            SessionType::Group
        );
        assert_eq!(SessionType::classify(ContentType::TEXT, None), SessionType::Single);
    }
}
