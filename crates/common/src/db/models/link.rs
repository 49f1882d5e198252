//! Link entity (`wt_link`): one row per pointer from `l_from` to `l_to`

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_link")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub l_file: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub l_from: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub l_type: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub l_to: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
