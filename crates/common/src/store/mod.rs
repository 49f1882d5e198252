//! Storage seams
//!
//! The record layer only ever asks two kinds of question: "give me the
//! GEDCOM for this xref" and "what links here". Tree, user and block
//! settings are a separate key-value surface. Both are traits so that the
//! SeaORM [`Repository`](crate::db::Repository) and the in-process
//! [`MemoryStore`] are interchangeable.

mod memory;

pub use memory::MemoryStore;

use crate::errors::Result;
use crate::privacy::DefaultRestriction;
use crate::records::RecordKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Tree preference: xref of the default individual for charts.
pub const PEDIGREE_ROOT_ID: &str = "PEDIGREE_ROOT_ID";

/// Tree preference: "1" enables privacy rules.
pub const HIDE_LIVE_PEOPLE: &str = "HIDE_LIVE_PEOPLE";

/// Tree preference: display title.
pub const TREE_TITLE: &str = "title";

/// User/tree preference: xref of the user's own individual record.
pub const USER_INDIVIDUAL: &str = "gedcomid";

/// User/tree preference: role in the tree.
pub const USER_ROLE: &str = "canedit";

/// User preference: "1" for site administrators.
pub const USER_IS_ADMIN: &str = "canadmin";

/// A family tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub id: i32,
    pub name: String,
    pub title: String,
}

/// A dashboard block instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: i32,
    pub tree_id: Option<i32>,
    pub user_id: Option<i32>,
    pub module_name: String,
}

/// Raw GEDCOM access keyed by `(xref, tree_id)`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// GEDCOM of a record of a known kind.
    async fn fetch_gedcom_record(
        &self,
        kind: RecordKind,
        xref: &str,
        tree_id: i32,
    ) -> Result<Option<String>>;

    /// Xrefs of every record that links to `xref`.
    async fn fetch_linked_from_ids(&self, xref: &str, tree_id: i32) -> Result<Vec<String>>;

    /// GEDCOM of a record of unknown kind.
    async fn fetch_any_gedcom_record(&self, xref: &str, tree_id: i32) -> Result<Option<String>> {
        for kind in RecordKind::LOOKUP_ORDER {
            if let Some(gedcom) = self.fetch_gedcom_record(kind, xref, tree_id).await? {
                return Ok(Some(gedcom));
            }
        }
        Ok(None)
    }

    /// Check connectivity of the backing store.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Tree, user and block settings.
#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn find_tree(&self, name: &str) -> Result<Option<Tree>>;

    async fn tree_preference(&self, tree_id: i32, name: &str) -> Result<Option<String>>;

    async fn user_preference(&self, user_id: i32, name: &str) -> Result<Option<String>>;

    async fn user_tree_preference(
        &self,
        user_id: i32,
        tree_id: i32,
        name: &str,
    ) -> Result<Option<String>>;

    async fn default_restrictions(&self, tree_id: i32) -> Result<Vec<DefaultRestriction>>;

    async fn find_block(&self, block_id: i32) -> Result<Option<Block>>;

    async fn block_setting(&self, block_id: i32, name: &str) -> Result<Option<String>>;

    /// Store a block setting; `None` deletes it. Last write wins.
    async fn set_block_setting(&self, block_id: i32, name: &str, value: Option<&str>) -> Result<()>;
}

/// Empty strings in settings mean "not set".
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
