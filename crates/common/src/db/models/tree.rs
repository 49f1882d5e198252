//! Family tree entity (`wt_gedcom`)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_gedcom")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub gedcom_id: i32,

    #[sea_orm(unique)]
    pub gedcom_name: String,

    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tree_setting::Entity")]
    Settings,
}

impl Related<super::tree_setting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
