//! Trusted / blocked sender lists maintained by the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the two named trust lists an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustListKind {
    Whitelist,
    Blacklist,
}

impl TrustListKind {
    /// The other list. An address may belong to at most one of the two.
    pub fn opposite(self) -> Self {
        match self {
            TrustListKind::Whitelist => TrustListKind::Blacklist,
            TrustListKind::Blacklist => TrustListKind::Whitelist,
        }
    }

    /// Storage key this list is persisted under.
    pub fn storage_key(self) -> &'static str {
        match self {
            TrustListKind::Whitelist => "whitelist",
            TrustListKind::Blacklist => "blacklist",
        }
    }
}

impl std::fmt::Display for TrustListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// A single address on a trust list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustListEntry {
    pub email_address: String,
    pub added_at: DateTime<Utc>,
}

impl TrustListEntry {
    pub fn new(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            added_at: Utc::now(),
        }
    }
}

/// Snapshot of both trust lists, as returned to the options page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrustLists {
    #[serde(default)]
    pub whitelist: Vec<TrustListEntry>,
    #[serde(default)]
    pub blacklist: Vec<TrustListEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn opposite_is_involutive() {
        assert_eq!(
            TrustListKind::Whitelist.opposite(),
            TrustListKind::Blacklist
        );
        assert_eq!(
            TrustListKind::Blacklist.opposite().opposite(),
            TrustListKind::Blacklist
        );
    }

    #[test]
    fn kind_wire_names() {
        let kind: TrustListKind = serde_json::from_str("\"whitelist\"").unwrap();
        assert_eq!(kind, TrustListKind::Whitelist);
        assert_eq!(
            serde_json::to_string(&TrustListKind::Blacklist).unwrap(),
            "\"blacklist\""
        );
    }

    #[test]
    fn entry_carries_address() {
        let entry = TrustListEntry::new("sender@example.com");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"email_address\":\"sender@example.com\""));
    }
}
