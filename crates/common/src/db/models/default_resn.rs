//! Default restriction entity (`wt_default_resn`)

use crate::privacy::{AccessLevel, DefaultRestriction};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wt_default_resn")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub default_resn_id: i32,

    pub gedcom_id: i32,

    #[sea_orm(nullable)]
    pub xref: Option<String>,

    #[sea_orm(nullable)]
    pub tag_type: Option<String>,

    /// `none`, `privacy`, `confidential` or `hidden`
    pub resn: String,
}

impl Model {
    /// `None` for rows with an unknown keyword.
    pub fn into_restriction(self) -> Option<DefaultRestriction> {
        let level = AccessLevel::from_resn(&self.resn)?;
        Some(DefaultRestriction {
            xref: self.xref.filter(|x| !x.is_empty()),
            tag_type: self.tag_type.filter(|t| !t.is_empty()),
            level,
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
