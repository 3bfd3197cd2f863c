//! Version store repository
//!
//! Append-only access to `tender_versions`. Writers call it with their open
//! transaction so the snapshot commits or rolls back together with the
//! tender row it describes.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::error::{TenderError, db_err};
use crate::models::tender;
use crate::models::tender_version::{self, Entity as TenderVersion};

#[derive(Debug, Clone, Copy)]
pub struct TenderVersionRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TenderVersionRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Appends a snapshot of `tender` at `tender.version`.
    ///
    /// The unique `(tender_id, version)` index rejects a second snapshot for
    /// the same version; that surfaces as `Conflict`.
    pub async fn append(&self, tender: &tender::Model) -> Result<tender_version::Model, TenderError> {
        let snapshot = tender_version::ActiveModel {
            id: NotSet,
            tender_id: Set(tender.id),
            version: Set(tender.version),
            name: Set(tender.name.clone()),
            description: Set(tender.description.clone()),
            service_type: Set(tender.service_type.clone()),
            status: Set(tender.status),
            organization_id: Set(tender.organization_id),
            creator_username: Set(tender.creator_username.clone()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        snapshot
            .insert(self.conn)
            .await
            .map_err(db_err("append tender version"))
    }

    pub async fn find(
        &self,
        tender_id: Uuid,
        version: i32,
    ) -> Result<Option<tender_version::Model>, TenderError> {
        TenderVersion::find()
            .filter(tender_version::Column::TenderId.eq(tender_id))
            .filter(tender_version::Column::Version.eq(version))
            .one(self.conn)
            .await
            .map_err(db_err("load tender version"))
    }

    /// Highest version recorded for the tender, `None` when it has no history
    pub async fn max_version(&self, tender_id: Uuid) -> Result<Option<i32>, TenderError> {
        let max: Option<Option<i32>> = TenderVersion::find()
            .select_only()
            .column_as(tender_version::Column::Version.max(), "max_version")
            .filter(tender_version::Column::TenderId.eq(tender_id))
            .into_tuple()
            .one(self.conn)
            .await
            .map_err(db_err("compute max tender version"))?;

        Ok(max.flatten())
    }

    /// All snapshots of the tender, oldest first
    pub async fn history(&self, tender_id: Uuid) -> Result<Vec<tender_version::Model>, TenderError> {
        TenderVersion::find()
            .filter(tender_version::Column::TenderId.eq(tender_id))
            .order_by_asc(tender_version::Column::Version)
            .all(self.conn)
            .await
            .map_err(db_err("list tender versions"))
    }

    pub async fn count(&self, tender_id: Uuid) -> Result<u64, TenderError> {
        TenderVersion::find()
            .filter(tender_version::Column::TenderId.eq(tender_id))
            .count(self.conn)
            .await
            .map_err(db_err("count tender versions"))
    }
}
