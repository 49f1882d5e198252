//! Dashboard block entity (`wt_block`)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_block")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub block_id: i32,

    /// Set for blocks on a tree dashboard
    #[sea_orm(nullable)]
    pub gedcom_id: Option<i32>,

    /// Set for blocks on a user dashboard
    #[sea_orm(nullable)]
    pub user_id: Option<i32>,

    #[sea_orm(nullable)]
    pub xref: Option<String>,

    /// `main` or `side`
    pub location: Option<String>,

    pub block_order: i32,

    pub module_name: String,
}

impl Model {
    pub fn into_block(self) -> crate::store::Block {
        crate::store::Block {
            id: self.block_id,
            tree_id: self.gedcom_id,
            user_id: self.user_id,
            module_name: self.module_name,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::block_setting::Entity")]
    Settings,
}

impl Related<super::block_setting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
