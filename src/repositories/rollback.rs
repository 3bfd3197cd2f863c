//! Rollback engine
//!
//! Restores a tender's content from a historical snapshot. History is never
//! rewritten: the restored content becomes a new snapshot numbered one past
//! the current maximum, so rolling back twice to the same version produces
//! two new versions with identical content.

use std::sync::Arc;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

use crate::error::{TenderError, db_err};
use crate::models::tender::{self, Entity as Tender};
use crate::observability::SharedObserver;

use super::authorization::AuthorizationRepository;
use super::tender::{commit, lock_tender};
use super::tender_version::TenderVersionRepository;

#[derive(Debug, Clone)]
pub struct RollbackRepository {
    db: Arc<DatabaseConnection>,
    observer: SharedObserver,
}

impl RollbackRepository {
    pub fn new(db: Arc<DatabaseConnection>, observer: SharedObserver) -> Self {
        Self { db, observer }
    }

    /// Copies snapshot `target_version` forward as the tender's newest version.
    ///
    /// Status transition rules do not apply here; the snapshot's status is
    /// restored as-is together with its other content.
    pub async fn rollback(
        &self,
        tender_id: Uuid,
        target_version: i32,
        username: &str,
    ) -> Result<tender::Model, TenderError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_err("begin rollback transaction"))?;

        AuthorizationRepository::new(&txn)
            .ensure_user_exists(username)
            .await?;

        let current = lock_tender(&txn, tender_id).await?;

        let version_not_found = || TenderError::VersionNotFound {
            tender_id,
            version: target_version,
        };
        if target_version < 1 {
            return Err(version_not_found());
        }

        let versions = TenderVersionRepository::new(&txn);
        let snapshot = versions
            .find(tender_id, target_version)
            .await?
            .ok_or_else(version_not_found)?;

        // Anchor on the stored maximum, not on the target or the row counter.
        let new_version = versions
            .max_version(tender_id)
            .await?
            .unwrap_or(current.version)
            .max(current.version)
            + 1;

        let result = Tender::update_many()
            .col_expr(tender::Column::Name, Expr::value(snapshot.name))
            .col_expr(tender::Column::Description, Expr::value(snapshot.description))
            .col_expr(tender::Column::ServiceType, Expr::value(snapshot.service_type))
            .col_expr(tender::Column::Status, Expr::value(snapshot.status))
            .col_expr(tender::Column::Version, Expr::value(new_version))
            .filter(tender::Column::Id.eq(tender_id))
            .filter(tender::Column::Version.eq(current.version))
            .exec(&txn)
            .await
            .map_err(db_err("rollback tender"))?;

        if result.rows_affected == 0 {
            return Err(TenderError::Conflict {
                operation: "rollback tender",
                source: None,
            });
        }

        let restored = Tender::find_by_id(tender_id)
            .one(&txn)
            .await
            .map_err(db_err("reload tender"))?
            .ok_or(TenderError::TenderNotFound { tender_id })?;

        versions.append(&restored).await?;
        commit(txn, "commit tender rollback").await?;

        self.observer
            .version_appended("rollback", restored.id, restored.version);
        Ok(restored)
    }
}
