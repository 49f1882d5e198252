//! In-process store
//!
//! Backs unit and router tests. Links are derived from record pointers on
//! insert and are not removed with the record, so a removed record leaves
//! dangling links just as a half-edited database would.

use super::{non_empty, Block, RecordStore, SettingStore, Tree};
use crate::errors::Result;
use crate::gedcom;
use crate::privacy::DefaultRestriction;
use crate::records::RecordKind;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    records: HashMap<(i32, String), String>,
    /// `(tree, from, to)`, in insertion order.
    links: Vec<(i32, String, String)>,
    trees: Vec<Tree>,
    tree_settings: HashMap<(i32, String), String>,
    user_settings: HashMap<(i32, String), String>,
    user_tree_settings: HashMap<(i32, i32, String), String>,
    restrictions: HashMap<i32, Vec<DefaultRestriction>>,
    blocks: HashMap<i32, Block>,
    block_settings: HashMap<(i32, String), String>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add or replace a record and its outgoing links. Returns the xref, or
    /// `None` if the text has no `0 @XREF@ TAG` line.
    pub fn add_record(&self, tree_id: i32, gedcom: &str) -> Option<String> {
        let header = gedcom::parse_header(gedcom)?;
        let mut tables = self.write();

        tables
            .links
            .retain(|(tree, from, _)| !(*tree == tree_id && *from == header.xref));
        for (_, target) in gedcom::extract_pointers(gedcom) {
            tables.links.push((tree_id, header.xref.clone(), target));
        }

        tables
            .records
            .insert((tree_id, header.xref.clone()), gedcom.to_string());

        Some(header.xref)
    }

    /// Remove a record but leave links pointing from it in place.
    pub fn remove_record(&self, tree_id: i32, xref: &str) {
        self.write().records.remove(&(tree_id, xref.to_string()));
    }

    pub fn add_link(&self, tree_id: i32, from: &str, to: &str) {
        self.write()
            .links
            .push((tree_id, from.to_string(), to.to_string()));
    }

    pub fn add_tree(&self, tree: Tree) {
        let mut tables = self.write();
        tables.trees.retain(|t| t.id != tree.id);
        tables.trees.push(tree);
    }

    pub fn set_tree_preference(&self, tree_id: i32, name: &str, value: &str) {
        self.write()
            .tree_settings
            .insert((tree_id, name.to_string()), value.to_string());
    }

    pub fn set_user_preference(&self, user_id: i32, name: &str, value: &str) {
        self.write()
            .user_settings
            .insert((user_id, name.to_string()), value.to_string());
    }

    pub fn set_user_tree_preference(&self, user_id: i32, tree_id: i32, name: &str, value: &str) {
        self.write()
            .user_tree_settings
            .insert((user_id, tree_id, name.to_string()), value.to_string());
    }

    pub fn add_default_restriction(&self, tree_id: i32, restriction: DefaultRestriction) {
        self.write()
            .restrictions
            .entry(tree_id)
            .or_default()
            .push(restriction);
    }

    pub fn add_block(&self, block: Block) {
        self.write().blocks.insert(block.id, block);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_gedcom_record(
        &self,
        kind: RecordKind,
        xref: &str,
        tree_id: i32,
    ) -> Result<Option<String>> {
        let tables = self.read();
        let Some(gedcom) = tables.records.get(&(tree_id, xref.to_string())) else {
            return Ok(None);
        };

        let actual = gedcom::parse_header(gedcom)
            .map(|header| RecordKind::from_tag(&header.tag))
            .unwrap_or(RecordKind::Other);

        Ok(kind.accepts(actual).then(|| gedcom.clone()))
    }

    async fn fetch_linked_from_ids(&self, xref: &str, tree_id: i32) -> Result<Vec<String>> {
        let tables = self.read();
        let mut linked: Vec<String> = Vec::new();

        for (tree, from, to) in &tables.links {
            if *tree == tree_id && to == xref && !linked.contains(from) {
                linked.push(from.clone());
            }
        }

        Ok(linked)
    }
}

#[async_trait]
impl SettingStore for MemoryStore {
    async fn find_tree(&self, name: &str) -> Result<Option<Tree>> {
        Ok(self.read().trees.iter().find(|t| t.name == name).cloned())
    }

    async fn tree_preference(&self, tree_id: i32, name: &str) -> Result<Option<String>> {
        let value = self
            .read()
            .tree_settings
            .get(&(tree_id, name.to_string()))
            .cloned();
        Ok(non_empty(value))
    }

    async fn user_preference(&self, user_id: i32, name: &str) -> Result<Option<String>> {
        let value = self
            .read()
            .user_settings
            .get(&(user_id, name.to_string()))
            .cloned();
        Ok(non_empty(value))
    }

    async fn user_tree_preference(
        &self,
        user_id: i32,
        tree_id: i32,
        name: &str,
    ) -> Result<Option<String>> {
        let value = self
            .read()
            .user_tree_settings
            .get(&(user_id, tree_id, name.to_string()))
            .cloned();
        Ok(non_empty(value))
    }

    async fn default_restrictions(&self, tree_id: i32) -> Result<Vec<DefaultRestriction>> {
        Ok(self
            .read()
            .restrictions
            .get(&tree_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_block(&self, block_id: i32) -> Result<Option<Block>> {
        Ok(self.read().blocks.get(&block_id).cloned())
    }

    async fn block_setting(&self, block_id: i32, name: &str) -> Result<Option<String>> {
        let value = self
            .read()
            .block_settings
            .get(&(block_id, name.to_string()))
            .cloned();
        Ok(non_empty(value))
    }

    async fn set_block_setting(&self, block_id: i32, name: &str, value: Option<&str>) -> Result<()> {
        let mut tables = self.write();
        let key = (block_id, name.to_string());
        match value {
            Some(value) => {
                tables.block_settings.insert(key, value.to_string());
            }
            None => {
                tables.block_settings.remove(&key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::AccessLevel;

    #[tokio::test]
    async fn test_records_are_fetched_by_kind() {
        let store = MemoryStore::new();
        assert_eq!(store.add_record(1, "0 @I1@ INDI\n1 NAME A /B/"), Some("I1".to_string()));
        store.add_record(1, "0 @N1@ NOTE shared");
        assert_eq!(store.add_record(1, "not gedcom"), None);

        assert!(store.fetch_gedcom_record(RecordKind::Individual, "I1", 1).await.unwrap().is_some());
        assert!(store.fetch_gedcom_record(RecordKind::Media, "I1", 1).await.unwrap().is_none());
        assert!(store.fetch_gedcom_record(RecordKind::Other, "N1", 1).await.unwrap().is_some());
        assert!(store.fetch_gedcom_record(RecordKind::Individual, "I1", 2).await.unwrap().is_none());
        assert!(store.fetch_any_gedcom_record("N1", 1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_links_follow_record_pointers() {
        let store = MemoryStore::new();
        store.add_record(1, "0 @I1@ INDI\n1 OBJE @M1@");
        store.add_record(1, "0 @F1@ FAM\n1 OBJE @M1@\n1 HUSB @I1@");
        store.add_record(1, "0 @M1@ OBJE\n1 FILE a.jpg");

        assert_eq!(store.fetch_linked_from_ids("M1", 1).await.unwrap(), vec!["I1", "F1"]);

        // Replacing a record replaces its links.
        store.add_record(1, "0 @I1@ INDI");
        assert_eq!(store.fetch_linked_from_ids("M1", 1).await.unwrap(), vec!["F1"]);

        // Removing it does not.
        store.remove_record(1, "F1");
        assert_eq!(store.fetch_linked_from_ids("M1", 1).await.unwrap(), vec!["F1"]);
    }

    #[tokio::test]
    async fn test_settings() {
        let store = MemoryStore::new();
        store.add_tree(Tree { id: 3, name: "demo".into(), title: "Demo".into() });
        store.set_tree_preference(3, "PEDIGREE_ROOT_ID", "I1");
        store.set_tree_preference(3, "EMPTY", "");
        store.set_user_preference(7, "canadmin", "1");
        store.set_user_tree_preference(7, 3, "gedcomid", "I9");
        store.add_default_restriction(
            3,
            DefaultRestriction { xref: None, tag_type: Some("OBJE".into()), level: AccessLevel::Member },
        );

        assert_eq!(store.find_tree("demo").await.unwrap().map(|t| t.id), Some(3));
        assert!(store.find_tree("other").await.unwrap().is_none());
        assert_eq!(store.tree_preference(3, "PEDIGREE_ROOT_ID").await.unwrap().as_deref(), Some("I1"));
        assert_eq!(store.tree_preference(3, "EMPTY").await.unwrap(), None);
        assert_eq!(store.user_preference(7, "canadmin").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.user_tree_preference(7, 3, "gedcomid").await.unwrap().as_deref(), Some("I9"));
        assert_eq!(store.default_restrictions(3).await.unwrap().len(), 1);
        assert!(store.default_restrictions(4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_block_settings_last_write_wins() {
        let store = MemoryStore::new();
        store.add_block(Block { id: 5, tree_id: Some(1), user_id: None, module_name: "charts".into() });

        store.set_block_setting(5, "type", Some("pedigree")).await.unwrap();
        store.set_block_setting(5, "type", Some("treenav")).await.unwrap();
        assert_eq!(store.block_setting(5, "type").await.unwrap().as_deref(), Some("treenav"));

        store.set_block_setting(5, "type", None).await.unwrap();
        assert_eq!(store.block_setting(5, "type").await.unwrap(), None);
        assert_eq!(store.find_block(5).await.unwrap().map(|b| b.module_name), Some("charts".to_string()));
    }
}
