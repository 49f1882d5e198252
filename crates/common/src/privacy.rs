//! Access levels and per-tree privacy settings

use crate::errors::Result;
use crate::store::{SettingStore, HIDE_LIVE_PEOPLE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Who may see something, ordered from most to least privileged.
///
/// A viewer has an access level; a restriction is also expressed as an
/// access level, and a viewer passes it when `restriction >= viewer`.
/// `Hidden` as a viewer level bypasses privacy entirely; as a restriction it
/// hides from everybody else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Hidden = -1,
    Manager = 0,
    Member = 1,
    Visitor = 2,
}

impl AccessLevel {
    /// Map a stored restriction keyword (`default_resn.resn`).
    pub fn from_resn(resn: &str) -> Option<Self> {
        match resn.trim().to_ascii_lowercase().as_str() {
            "none" => Some(AccessLevel::Visitor),
            "privacy" => Some(AccessLevel::Member),
            "confidential" => Some(AccessLevel::Manager),
            "hidden" => Some(AccessLevel::Hidden),
            _ => None,
        }
    }
}

/// A record-level `1 RESN` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    None,
    Privacy,
    Confidential,
    Locked,
}

impl Restriction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Restriction::None),
            "privacy" => Some(Restriction::Privacy),
            "confidential" => Some(Restriction::Confidential),
            "locked" => Some(Restriction::Locked),
            _ => None,
        }
    }

    /// Decision for a viewer, or `None` when the restriction says nothing
    /// about visibility.
    pub fn allows(self, access: AccessLevel) -> Option<bool> {
        match self {
            Restriction::None => Some(true),
            Restriction::Privacy => Some(AccessLevel::Member >= access),
            Restriction::Confidential => Some(AccessLevel::Manager >= access),
            Restriction::Locked => None,
        }
    }
}

/// A `default_resn` row: restricts one record (`xref`) or every record or
/// fact with a tag (`tag_type`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultRestriction {
    pub xref: Option<String>,
    pub tag_type: Option<String>,
    pub level: AccessLevel,
}

/// Privacy configuration of one tree.
#[derive(Debug, Clone, Default)]
pub struct TreePrivacy {
    /// `HIDE_LIVE_PEOPLE`; when false every record is visible.
    pub enabled: bool,
    /// Restrictions on individual records, by xref.
    pub records: HashMap<String, AccessLevel>,
    /// Restrictions on whole record types, by tag (`OBJE`, `SOUR`, ...).
    pub record_types: HashMap<String, AccessLevel>,
}

impl TreePrivacy {
    /// Privacy switched off: everything is visible.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_record_type(mut self, tag: &str, level: AccessLevel) -> Self {
        self.record_types.insert(tag.to_string(), level);
        self
    }

    pub fn with_record(mut self, xref: &str, level: AccessLevel) -> Self {
        self.records.insert(xref.to_string(), level);
        self
    }

    /// Load the tree's privacy preference and default restrictions.
    pub async fn load(settings: &dyn SettingStore, tree_id: i32) -> Result<Self> {
        let enabled = settings
            .tree_preference(tree_id, HIDE_LIVE_PEOPLE)
            .await?
            .map(|value| value == "1")
            .unwrap_or(false);

        let mut privacy = Self {
            enabled,
            ..Self::default()
        };

        for restriction in settings.default_restrictions(tree_id).await? {
            match (restriction.xref, restriction.tag_type) {
                (Some(xref), None) => {
                    privacy.records.insert(xref, restriction.level);
                }
                (None, Some(tag)) => {
                    privacy.record_types.insert(tag, restriction.level);
                }
                // Fact restrictions on a single record do not affect record visibility.
                _ => {}
            }
        }

        Ok(privacy)
    }
}
