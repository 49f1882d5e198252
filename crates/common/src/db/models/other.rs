//! Entity for every other record type (`wt_other`): notes, repositories,
//! submitters and custom records

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_other")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub o_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub o_file: i32,

    /// Level-0 tag
    pub o_type: String,

    #[sea_orm(column_type = "Text")]
    pub o_gedcom: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
