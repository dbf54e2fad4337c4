//! The message option vector (§3, §4.1).
//!
//! Represented as a pair of bitmasks rather than a `HashMap<Key, bool>`:
//! one bit per key records whether it was ever explicitly set, the other
//! records its value. A key that was never set reads as `true` — the
//! "bias toward enable" query semantics §3 describes — independent of
//! whatever a caller might assume its conceptual default to be.
//!
//! [`MsgOptions::default`] therefore returns an all-unset mask. The one
//! documented exception, `IsSenderSync`, is force-set to `true` by
//! [`crate::message::Message::encapsulate`] at construction time rather
//! than by this default, so that content-type forcing (e.g. Typing
//! clearing it to `false`) has something explicit to override.

use serde::{Deserialize, Serialize};

/// One of the eleven boolean switches in the option map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    IsNotNotification,
    IsSendMsg,
    IsHistory,
    IsPersistent,
    IsOfflinePush,
    IsUnreadCount,
    IsConversationUpdate,
    IsSenderSync,
    IsNotPrivate,
    IsSenderConversationUpdate,
    IsReactionFromCache,
}

impl OptionKey {
    const ALL: [OptionKey; 11] = [
        OptionKey::IsNotNotification,
        OptionKey::IsSendMsg,
        OptionKey::IsHistory,
        OptionKey::IsPersistent,
        OptionKey::IsOfflinePush,
        OptionKey::IsUnreadCount,
        OptionKey::IsConversationUpdate,
        OptionKey::IsSenderSync,
        OptionKey::IsNotPrivate,
        OptionKey::IsSenderConversationUpdate,
        OptionKey::IsReactionFromCache,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// The option vector attached to a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MsgOptions {
    set_mask: u16,
    value_mask: u16,
}

impl MsgOptions {
    /// An all-unset option vector; every key reads `true` until set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query a key. An unset key reads as `true`.
    pub fn get(&self, key: OptionKey) -> bool {
        let bit = key.bit();
        if self.set_mask & bit != 0 {
            self.value_mask & bit != 0
        } else {
            true
        }
    }

    /// Explicitly set a key's value.
    pub fn set(&mut self, key: OptionKey, value: bool) -> &mut Self {
        let bit = key.bit();
        self.set_mask |= bit;
        if value {
            self.value_mask |= bit;
        } else {
            self.value_mask &= !bit;
        }
        self
    }

    /// Whether `key` has ever been explicitly assigned.
    pub fn is_set(&self, key: OptionKey) -> bool {
        self.set_mask & key.bit() != 0
    }
}

impl std::fmt::Display for MsgOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, key) in OptionKey::ALL.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}={}", key, self.get(*key))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_key_reads_true() {
        let opts = MsgOptions::new();
        assert!(opts.get(OptionKey::IsHistory));
        assert!(!opts.is_set(OptionKey::IsHistory));
    }

    #[test]
    fn explicit_false_disables() {
        let mut opts = MsgOptions::new();
        opts.set(OptionKey::IsUnreadCount, false);
        assert!(!opts.get(OptionKey::IsUnreadCount));
        assert!(opts.is_set(OptionKey::IsUnreadCount));
    }

    #[test]
    fn setting_twice_overwrites() {
        let mut opts = MsgOptions::new();
        opts.set(OptionKey::IsPersistent, false);
        opts.set(OptionKey::IsPersistent, true);
        assert!(opts.get(OptionKey::IsPersistent));
    }

    #[test]
    fn serde_round_trips_through_masks() {
        let mut opts = MsgOptions::new();
        opts.set(OptionKey::IsSenderSync, true);
        opts.set(OptionKey::IsHistory, false);
        let encoded = serde_json::to_string(&opts).unwrap();
        let decoded: MsgOptions = serde_json::from_str(&encoded).unwrap();
        assert_eq!(opts, decoded);
    }
}
