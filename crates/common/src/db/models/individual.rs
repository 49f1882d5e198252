//! Individual entity (`wt_individuals`)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_individuals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub i_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub i_file: i32,

    pub i_rin: String,

    pub i_sex: String,

    #[sea_orm(column_type = "Text")]
    pub i_gedcom: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
