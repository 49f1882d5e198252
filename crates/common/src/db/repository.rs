//! Repository over the webtrees schema
//!
//! Implements both storage traits so handlers never touch SeaORM directly.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use crate::privacy::DefaultRestriction;
use crate::records::{RecordKind, RecordTable};
use crate::store::{non_empty, Block, RecordStore, SettingStore, Tree, TREE_TITLE};
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use tracing::debug;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Records
    // ========================================================================

    async fn find_individual(&self, xref: &str, tree_id: i32) -> Result<Option<String>> {
        Ok(IndividualEntity::find_by_id((xref.to_string(), tree_id))
            .one(self.read_conn())
            .await?
            .map(|row| row.i_gedcom))
    }

    async fn find_family(&self, xref: &str, tree_id: i32) -> Result<Option<String>> {
        Ok(FamilyEntity::find_by_id((xref.to_string(), tree_id))
            .one(self.read_conn())
            .await?
            .map(|row| row.f_gedcom))
    }

    async fn find_source(&self, xref: &str, tree_id: i32) -> Result<Option<String>> {
        Ok(SourceEntity::find_by_id((xref.to_string(), tree_id))
            .one(self.read_conn())
            .await?
            .map(|row| row.s_gedcom))
    }

    async fn find_media(&self, xref: &str, tree_id: i32) -> Result<Option<String>> {
        Ok(MediaEntity::find_by_id((xref.to_string(), tree_id))
            .one(self.read_conn())
            .await?
            .map(|row| row.m_gedcom))
    }

    /// Rows of `wt_other`, narrowed to one type unless `record_type` is `None`.
    async fn find_other(&self, xref: &str, tree_id: i32, record_type: Option<&str>) -> Result<Option<String>> {
        let mut query = OtherEntity::find()
            .filter(OtherColumn::OId.eq(xref))
            .filter(OtherColumn::OFile.eq(tree_id));

        if let Some(record_type) = record_type {
            query = query.filter(OtherColumn::OType.eq(record_type));
        }

        Ok(query.one(self.read_conn()).await?.map(|row| row.o_gedcom))
    }
}

#[async_trait]
impl RecordStore for Repository {
    async fn fetch_gedcom_record(
        &self,
        kind: RecordKind,
        xref: &str,
        tree_id: i32,
    ) -> Result<Option<String>> {
        let gedcom = match kind.table() {
            RecordTable::Individuals => self.find_individual(xref, tree_id).await?,
            RecordTable::Families => self.find_family(xref, tree_id).await?,
            RecordTable::Sources => self.find_source(xref, tree_id).await?,
            RecordTable::Media => self.find_media(xref, tree_id).await?,
            RecordTable::Other => self.find_other(xref, tree_id, kind.tag()).await?,
        };

        if gedcom.is_none() {
            debug!(xref = %xref, tree_id, kind = ?kind, "Record not in database");
        }

        Ok(gedcom)
    }

    async fn fetch_linked_from_ids(&self, xref: &str, tree_id: i32) -> Result<Vec<String>> {
        let linked: Vec<String> = LinkEntity::find()
            .select_only()
            .column(LinkColumn::LFrom)
            .filter(LinkColumn::LFile.eq(tree_id))
            .filter(LinkColumn::LTo.eq(xref))
            .distinct()
            .into_tuple()
            .all(self.read_conn())
            .await?;

        Ok(linked)
    }

    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }
}

#[async_trait]
impl SettingStore for Repository {
    async fn find_tree(&self, name: &str) -> Result<Option<Tree>> {
        let Some(row) = TreeEntity::find()
            .filter(TreeColumn::GedcomName.eq(name))
            .one(self.read_conn())
            .await?
        else {
            return Ok(None);
        };

        let title = self
            .tree_preference(row.gedcom_id, TREE_TITLE)
            .await?
            .unwrap_or_else(|| row.gedcom_name.clone());

        Ok(Some(Tree {
            id: row.gedcom_id,
            name: row.gedcom_name,
            title,
        }))
    }

    async fn tree_preference(&self, tree_id: i32, name: &str) -> Result<Option<String>> {
        let value = TreeSettingEntity::find_by_id((tree_id, name.to_string()))
            .one(self.read_conn())
            .await?
            .map(|row| row.setting_value);

        Ok(non_empty(value))
    }

    async fn user_preference(&self, user_id: i32, name: &str) -> Result<Option<String>> {
        let value = UserSettingEntity::find_by_id((user_id, name.to_string()))
            .one(self.read_conn())
            .await?
            .map(|row| row.setting_value);

        Ok(non_empty(value))
    }

    async fn user_tree_preference(
        &self,
        user_id: i32,
        tree_id: i32,
        name: &str,
    ) -> Result<Option<String>> {
        let value = UserTreeSettingEntity::find_by_id((user_id, tree_id, name.to_string()))
            .one(self.read_conn())
            .await?
            .map(|row| row.setting_value);

        Ok(non_empty(value))
    }

    async fn default_restrictions(&self, tree_id: i32) -> Result<Vec<DefaultRestriction>> {
        let rows = DefaultResnEntity::find()
            .filter(DefaultResnColumn::GedcomId.eq(tree_id))
            .all(self.read_conn())
            .await?;

        Ok(rows.into_iter().filter_map(DefaultResn::into_restriction).collect())
    }

    async fn find_block(&self, block_id: i32) -> Result<Option<Block>> {
        Ok(BlockEntity::find_by_id(block_id)
            .one(self.read_conn())
            .await?
            .map(BlockRow::into_block))
    }

    async fn block_setting(&self, block_id: i32, name: &str) -> Result<Option<String>> {
        let value = BlockSettingEntity::find_by_id((block_id, name.to_string()))
            .one(self.read_conn())
            .await?
            .map(|row| row.setting_value);

        Ok(non_empty(value))
    }

    async fn set_block_setting(&self, block_id: i32, name: &str, value: Option<&str>) -> Result<()> {
        let Some(value) = value else {
            BlockSettingEntity::delete_by_id((block_id, name.to_string()))
                .exec(self.write_conn())
                .await?;
            return Ok(());
        };

        let setting = BlockSettingActiveModel {
            block_id: Set(block_id),
            setting_name: Set(name.to_string()),
            setting_value: Set(value.to_string()),
        };

        BlockSettingEntity::insert(setting)
            .on_conflict(
                OnConflict::columns([BlockSettingColumn::BlockId, BlockSettingColumn::SettingName])
                    .update_column(BlockSettingColumn::SettingValue)
                    .to_owned(),
            )
            .exec(self.write_conn())
            .await?;

        Ok(())
    }
}
