//! Block setting entity (`wt_block_setting`)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_block_setting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub block_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub setting_name: String,

    #[sea_orm(column_type = "Text")]
    pub setting_value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::block::Entity",
        from = "Column::BlockId",
        to = "super::block::Column::BlockId",
        on_delete = "Cascade"
    )]
    Block,
}

impl Related<super::block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Block.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
