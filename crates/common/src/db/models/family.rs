//! Family entity (`wt_families`)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_families")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub f_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub f_file: i32,

    #[sea_orm(nullable)]
    pub f_husb: Option<String>,

    #[sea_orm(nullable)]
    pub f_wife: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub f_gedcom: String,

    pub f_numchil: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
