//! Source entity (`wt_sources`)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_sources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub s_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub s_file: i32,

    pub s_name: String,

    #[sea_orm(column_type = "Text")]
    pub s_gedcom: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
