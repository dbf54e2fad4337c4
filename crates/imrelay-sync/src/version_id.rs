//! The opaque version handle (§3, §4.4).

use serde::{Deserialize, Serialize};

/// An opaque, sortable version handle. The sync engine never interprets
/// its contents beyond equality and the validity check below — §9's
/// open question about coupling it to the document store is resolved by
/// keeping it a plain string newtype with no parsing of its internals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(pub String);

impl VersionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// A valid client-supplied handle is non-empty and not the zero
    /// sentinel `"0"` a freshly-created client uses before it has ever
    /// synced.
    pub fn validate(&self) -> bool {
        !self.0.is_empty() && self.0 != "0"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_zero_are_invalid() {
        assert!(!VersionId::new("").validate());
        assert!(!VersionId::new("0").validate());
    }

    #[test]
    fn nonempty_handle_is_valid() {
        assert!(VersionId::new("01HZY").validate());
    }
}
