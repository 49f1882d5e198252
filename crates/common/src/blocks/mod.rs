//! Dashboard blocks
//!
//! A block renders against an explicit [`BlockContext`]: the tree (through
//! its record resolver), the viewer, and which dashboard the block sits on.

mod charts;
mod controller;

pub use charts::{ChartType, ChartsBlock, ChartsBlockForm, NOT_CONFIGURED};
pub use controller::{BoxChartController, ChartController, ChartPerson};

use crate::auth::Viewer;
use crate::records::RecordResolver;
use crate::store::{Block, SettingStore, Tree};

/// Which dashboard a block instance belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardKind {
    /// The tree's home page
    Tree,
    /// A user's personal page
    User,
}

impl DashboardKind {
    pub fn of(block: &Block) -> Self {
        if block.user_id.is_some() {
            DashboardKind::User
        } else {
            DashboardKind::Tree
        }
    }
}

/// Everything a block needs to know about the request.
pub struct BlockContext<'a> {
    pub viewer: &'a Viewer,
    pub dashboard: DashboardKind,
    pub resolver: &'a RecordResolver,
    pub settings: &'a dyn SettingStore,
}

impl<'a> BlockContext<'a> {
    pub fn tree(&self) -> &'a Tree {
        self.resolver.tree()
    }

    /// Tree managers configure tree dashboards; any signed-in user
    /// configures a personal one.
    pub fn can_configure(&self) -> bool {
        match self.dashboard {
            DashboardKind::Tree => self.viewer.is_manager(),
            DashboardKind::User => self.viewer.is_signed_in(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TreeRole;
    use crate::privacy::TreePrivacy;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_dashboard_kind() {
        let tree_block = Block { id: 1, tree_id: Some(1), user_id: None, module_name: "charts".into() };
        let user_block = Block { id: 2, tree_id: Some(1), user_id: Some(3), module_name: "charts".into() };
        assert_eq!(DashboardKind::of(&tree_block), DashboardKind::Tree);
        assert_eq!(DashboardKind::of(&user_block), DashboardKind::User);
    }

    #[test]
    fn test_can_configure() {
        let store = Arc::new(MemoryStore::new());
        let tree = Tree { id: 1, name: "demo".into(), title: "Demo".into() };
        let resolver = RecordResolver::new(tree, TreePrivacy::disabled(), store.clone());

        let visitor = Viewer::visitor();
        let member = Viewer { user_id: Some(2), role: TreeRole::Edit, ..Viewer::visitor() };
        let manager = Viewer { user_id: Some(3), role: TreeRole::Admin, ..Viewer::visitor() };

        let can_configure = |viewer: &Viewer, dashboard| {
            BlockContext {
                viewer,
                dashboard,
                resolver: &resolver,
                settings: store.as_ref(),
            }
            .can_configure()
        };

        assert!(!can_configure(&visitor, DashboardKind::Tree));
        assert!(!can_configure(&member, DashboardKind::Tree));
        assert!(can_configure(&manager, DashboardKind::Tree));
        assert!(!can_configure(&visitor, DashboardKind::User));
        assert!(can_configure(&member, DashboardKind::User));
    }
}
