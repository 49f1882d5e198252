//! API handlers module

pub mod blocks;
pub mod health;
pub mod media;

use crate::AppState;
use webtrees_common::auth::{Session, Viewer};
use webtrees_common::errors::{AppError, Result};
use webtrees_common::RecordResolver;

/// A tree as seen by the current viewer.
pub struct TreeScope {
    pub viewer: Viewer,
    pub resolver: RecordResolver,
}

/// Resolve a tree by name and load the viewer's rights and the tree's
/// privacy settings. Each request gets its own resolver, so record and
/// visibility caches never outlive it.
pub async fn tree_scope(state: &AppState, tree_name: &str, session: Session) -> Result<TreeScope> {
    let tree = state
        .settings
        .find_tree(tree_name)
        .await?
        .ok_or_else(|| AppError::TreeNotFound {
            name: tree_name.to_string(),
        })?;

    let viewer = Viewer::load(state.settings.as_ref(), session.user_id, tree.id).await?;
    let resolver = RecordResolver::load(tree, state.settings.as_ref(), state.records.clone()).await?;

    Ok(TreeScope { viewer, resolver })
}
