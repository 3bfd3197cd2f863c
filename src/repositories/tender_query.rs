//! Tender reader
//!
//! Read-only queries over the current tender rows and their history. These
//! run directly on the pool without an explicit transaction.

use std::sync::Arc;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::error::{TenderError, db_err};
use crate::models::tender::{self, Entity as Tender, TenderStatus};
use crate::models::tender_version;

use super::authorization::AuthorizationRepository;
use super::tender_version::TenderVersionRepository;

/// Offset pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Largest limit or offset the store accepts (SQL `BIGINT`)
    pub const MAX_WINDOW: u64 = i64::MAX as u64;

    fn bounded(self) -> Self {
        Self {
            limit: self.limit.min(Self::MAX_WINDOW),
            offset: self.offset.min(Self::MAX_WINDOW),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TenderQueryRepository {
    db: Arc<DatabaseConnection>,
}

impl TenderQueryRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists tenders ordered by name, optionally restricted to the given
    /// service types. An empty filter matches every tender.
    pub async fn list(
        &self,
        page: Page,
        service_types: &[String],
    ) -> Result<Vec<tender::Model>, TenderError> {
        let page = page.bounded();
        let mut query = Tender::find();
        if !service_types.is_empty() {
            query = query.filter(tender::Column::ServiceType.is_in(service_types.iter().cloned()));
        }

        query
            .order_by_asc(tender::Column::Name)
            .order_by_asc(tender::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&*self.db)
            .await
            .map_err(db_err("list tenders"))
    }

    /// Lists the tenders created by `username`
    pub async fn list_by_creator(
        &self,
        page: Page,
        username: &str,
    ) -> Result<Vec<tender::Model>, TenderError> {
        AuthorizationRepository::new(&*self.db)
            .ensure_user_exists(username)
            .await?;

        let page = page.bounded();
        Tender::find()
            .filter(tender::Column::CreatorUsername.eq(username))
            .order_by_asc(tender::Column::Name)
            .order_by_asc(tender::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&*self.db)
            .await
            .map_err(db_err("list tenders by creator"))
    }

    pub async fn get(&self, tender_id: Uuid) -> Result<tender::Model, TenderError> {
        Tender::find_by_id(tender_id)
            .one(&*self.db)
            .await
            .map_err(db_err("load tender"))?
            .ok_or(TenderError::TenderNotFound { tender_id })
    }

    pub async fn get_status(
        &self,
        tender_id: Uuid,
        username: &str,
    ) -> Result<TenderStatus, TenderError> {
        AuthorizationRepository::new(&*self.db)
            .ensure_user_exists(username)
            .await?;

        let status: Option<TenderStatus> = Tender::find_by_id(tender_id)
            .select_only()
            .column(tender::Column::Status)
            .into_tuple()
            .one(&*self.db)
            .await
            .map_err(db_err("load tender status"))?;

        status.ok_or(TenderError::TenderNotFound { tender_id })
    }

    /// Every snapshot of the tender, oldest first
    pub async fn history(
        &self,
        tender_id: Uuid,
        username: &str,
    ) -> Result<Vec<tender_version::Model>, TenderError> {
        AuthorizationRepository::new(&*self.db)
            .ensure_user_exists(username)
            .await?;
        self.get(tender_id).await?;

        TenderVersionRepository::new(&*self.db)
            .history(tender_id)
            .await
    }
}
