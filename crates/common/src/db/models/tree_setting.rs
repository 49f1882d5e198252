//! Tree preference entity (`wt_gedcom_setting`)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_gedcom_setting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub gedcom_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub setting_name: String,

    #[sea_orm(column_type = "Text")]
    pub setting_value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tree::Entity",
        from = "Column::GedcomId",
        to = "super::tree::Column::GedcomId"
    )]
    Tree,
}

impl Related<super::tree::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tree.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
