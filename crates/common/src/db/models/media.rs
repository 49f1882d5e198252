//! Media object entity (`wt_media`)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_media")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub m_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub m_file: i32,

    /// Full GEDCOM of the object, `FILE` facts included
    #[sea_orm(column_type = "Text")]
    pub m_gedcom: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
