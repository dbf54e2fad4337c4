//! Message content-type codes and the notification range (§4.1, §4.5).

use serde::{Deserialize, Serialize};

/// A message's content-type code.
///
/// Codes below [`ContentType::NOTIFICATION_BEGIN`] are ordinary message
/// content; codes in `[NOTIFICATION_BEGIN, NOTIFICATION_END]` are system
/// notifications (membership changes, group lifecycle events, and the
/// like), per [`ContentType::is_notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentType(pub i32);

impl ContentType {
    pub const TEXT: Self = Self(101);
    pub const IMAGE: Self = Self(102);
    pub const VOICE: Self = Self(103);
    pub const VIDEO: Self = Self(104);
    pub const FILE: Self = Self(105);
    pub const SIGNALING: Self = Self(106);
    pub const REVOKE: Self = Self(107);
    pub const READ_RECEIPT: Self = Self(108);
    pub const TYPING: Self = Self(109);
    pub const ROOM_PARTICIPANTS_CONNECTED: Self = Self(110);
    pub const ROOM_PARTICIPANTS_DISCONNECTED: Self = Self(111);
    pub const CUSTOM: Self = Self(199);

    pub const NOTIFICATION_BEGIN: Self = Self(1000);
    pub const NOTIFICATION_END: Self = Self(1999);
    pub const MEMBER_QUIT: Self = Self(1103);
    pub const MEMBER_KICKED: Self = Self(1104);
    pub const GROUP_DISMISSED: Self = Self(1105);

    pub fn is_notification(self) -> bool {
        self >= Self::NOTIFICATION_BEGIN && self <= Self::NOTIFICATION_END
    }

    pub fn is_membership_changing_notification(self) -> bool {
        matches!(self, Self::MEMBER_QUIT | Self::MEMBER_KICKED | Self::GROUP_DISMISSED)
    }

    /// Default offline-push title for this content type, used when the
    /// message carries no explicit `OfflinePushInfo` (§4.5).
    pub fn default_push_title(self) -> &'static str {
        match self {
            Self::TEXT => "New message",
            Self::IMAGE => "[Image]",
            Self::VOICE => "[Voice message]",
            Self::VIDEO => "[Video]",
            Self::FILE => "[File]",
            Self::SIGNALING => "[Call]",
            _ => "[New message]",
        }
    }
}

impl From<i32> for ContentType {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_range_is_inclusive() {
        assert!(ContentType::NOTIFICATION_BEGIN.is_notification());
        assert!(ContentType::NOTIFICATION_END.is_notification());
        assert!(ContentType::MEMBER_QUIT.is_notification());
        assert!(!ContentType::TEXT.is_notification());
    }

    #[test]
    fn membership_changing_notifications_are_recognized() {
        assert!(ContentType::MEMBER_KICKED.is_membership_changing_notification());
        assert!(ContentType::GROUP_DISMISSED.is_membership_changing_notification());
        assert!(!ContentType::TEXT.is_membership_changing_notification());
    }

    #[test]
    fn default_titles_cover_known_types() {
        assert_eq!(ContentType::IMAGE.default_push_title(), "[Image]");
        assert_eq!(ContentType::CUSTOM.default_push_title(), "[New message]");
    }
}
