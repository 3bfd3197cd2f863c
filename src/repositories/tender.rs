//! Tender writer
//!
//! Every mutation of a tender row runs in one transaction that also appends
//! the matching snapshot to the version store, so `tender.version` never gets
//! ahead of the history. Writers on the same tender are serialized by locking
//! the row (`SELECT ... FOR UPDATE`) before the version is read, and the
//! update itself is guarded by the version that was read.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{TenderError, db_err};
use crate::models::tender::{self, Entity as Tender, TenderStatus};
use crate::observability::SharedObserver;

use super::authorization::AuthorizationRepository;
use super::tender_version::TenderVersionRepository;

/// Input for [`TenderRepository::create`]
#[derive(Debug, Clone)]
pub struct NewTender {
    pub name: String,
    pub description: String,
    pub service_type: String,
    pub organization_id: Uuid,
    pub creator_username: String,
}

/// Sparse set of content changes for [`TenderRepository::update_partial`].
///
/// Only present, non-blank values are applied, with surrounding whitespace
/// trimmed as on creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderDeltas {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<String>,
}

impl TenderDeltas {
    fn applicable(value: &Option<String>) -> Option<&str> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        Self::applicable(&self.name)
    }

    pub fn description(&self) -> Option<&str> {
        Self::applicable(&self.description)
    }

    pub fn service_type(&self) -> Option<&str> {
        Self::applicable(&self.service_type)
    }

    pub fn is_empty(&self) -> bool {
        self.name().is_none() && self.description().is_none() && self.service_type().is_none()
    }
}

/// Repository for versioned tender writes
#[derive(Debug, Clone)]
pub struct TenderRepository {
    /// Database connection pool
    db: Arc<DatabaseConnection>,
    observer: SharedObserver,
}

impl TenderRepository {
    pub fn new(db: Arc<DatabaseConnection>, observer: SharedObserver) -> Self {
        Self { db, observer }
    }

    /// Creates a tender at version 1 with status `CREATED` together with its
    /// first snapshot.
    ///
    /// The creator must exist (`UserNotFound`) and be responsible for the
    /// organization (`NotAuthorized`).
    pub async fn create(&self, new: NewTender) -> Result<tender::Model, TenderError> {
        let txn = self.begin().await?;

        let authz = AuthorizationRepository::new(&txn);
        let user_id = authz.resolve_user_id(&new.creator_username).await?;
        if !authz.is_responsible(user_id, new.organization_id).await? {
            return Err(TenderError::NotAuthorized {
                username: new.creator_username,
                organization_id: new.organization_id,
            });
        }

        let created = tender::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name),
            description: Set(new.description),
            status: Set(TenderStatus::INITIAL),
            service_type: Set(new.service_type),
            organization_id: Set(new.organization_id),
            creator_username: Set(new.creator_username),
            version: Set(1),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(&txn)
        .await
        .map_err(db_err("insert tender"))?;

        TenderVersionRepository::new(&txn).append(&created).await?;
        commit(txn, "commit tender creation").await?;

        self.observer
            .version_appended("create", created.id, created.version);
        Ok(created)
    }

    /// Applies the non-blank fields of `deltas` and appends the new snapshot.
    pub async fn update_partial(
        &self,
        tender_id: Uuid,
        deltas: &TenderDeltas,
        username: &str,
    ) -> Result<tender::Model, TenderError> {
        if deltas.is_empty() {
            return Err(TenderError::NoFieldsToUpdate);
        }

        let txn = self.begin().await?;
        AuthorizationRepository::new(&txn)
            .ensure_user_exists(username)
            .await?;

        let current = lock_tender(&txn, tender_id).await?;

        let mut update = Tender::update_many();
        if let Some(name) = deltas.name() {
            update = update.col_expr(tender::Column::Name, Expr::value(name));
        }
        if let Some(description) = deltas.description() {
            update = update.col_expr(tender::Column::Description, Expr::value(description));
        }
        if let Some(service_type) = deltas.service_type() {
            update = update.col_expr(tender::Column::ServiceType, Expr::value(service_type));
        }

        let updated = bump_version(&txn, update, &current, "update tender").await?;
        TenderVersionRepository::new(&txn).append(&updated).await?;
        commit(txn, "commit tender update").await?;

        self.observer
            .version_appended("update_partial", updated.id, updated.version);
        Ok(updated)
    }

    /// Moves the tender to `new_status`.
    ///
    /// A status change is a versioned change: it increments the version and
    /// appends a snapshot like any content edit. Moves outside the transition
    /// table of [`TenderStatus`] fail with `InvalidStatus`.
    pub async fn update_status(
        &self,
        tender_id: Uuid,
        new_status: TenderStatus,
        username: &str,
    ) -> Result<tender::Model, TenderError> {
        let txn = self.begin().await?;
        AuthorizationRepository::new(&txn)
            .ensure_user_exists(username)
            .await?;

        let current = lock_tender(&txn, tender_id).await?;
        if !current.status.can_transition_to(new_status) {
            return Err(TenderError::InvalidStatus {
                message: format!(
                    "cannot move tender from {} to {}",
                    current.status, new_status
                ),
            });
        }

        let update = Tender::update_many().col_expr(tender::Column::Status, Expr::value(new_status));
        let updated = bump_version(&txn, update, &current, "update tender status").await?;
        TenderVersionRepository::new(&txn).append(&updated).await?;
        commit(txn, "commit tender status update").await?;

        self.observer
            .version_appended("update_status", updated.id, updated.version);
        Ok(updated)
    }

    async fn begin(&self) -> Result<DatabaseTransaction, TenderError> {
        self.db.begin().await.map_err(db_err("begin tender transaction"))
    }
}

/// Reads the tender row under an exclusive lock for the rest of the transaction.
pub(crate) async fn lock_tender(
    txn: &DatabaseTransaction,
    tender_id: Uuid,
) -> Result<tender::Model, TenderError> {
    Tender::find_by_id(tender_id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(db_err("lock tender"))?
        .ok_or(TenderError::TenderNotFound { tender_id })
}

/// Executes `update` against `current` with `version = version + 1`, guarded
/// by the version that was read, and returns the row as written.
async fn bump_version(
    txn: &DatabaseTransaction,
    update: sea_orm::UpdateMany<Tender>,
    current: &tender::Model,
    operation: &'static str,
) -> Result<tender::Model, TenderError> {
    let result = update
        .col_expr(
            tender::Column::Version,
            Expr::col(tender::Column::Version).add(1),
        )
        .filter(tender::Column::Id.eq(current.id))
        .filter(tender::Column::Version.eq(current.version))
        .exec(txn)
        .await
        .map_err(db_err(operation))?;

    if result.rows_affected == 0 {
        return Err(TenderError::Conflict {
            operation,
            source: None,
        });
    }

    Tender::find_by_id(current.id)
        .one(txn)
        .await
        .map_err(db_err("reload tender"))?
        .ok_or(TenderError::TenderNotFound {
            tender_id: current.id,
        })
}

pub(crate) async fn commit(
    txn: DatabaseTransaction,
    operation: &'static str,
) -> Result<(), TenderError> {
    txn.commit().await.map_err(db_err(operation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_deltas_are_not_applicable() {
        let deltas = TenderDeltas {
            name: Some("   ".into()),
            description: Some(String::new()),
            service_type: None,
        };
        assert!(deltas.is_empty());
        assert!(TenderDeltas::default().is_empty());
    }

    #[test]
    fn deltas_keep_present_values() {
        let deltas = TenderDeltas {
            name: None,
            description: Some("Phase 2".into()),
            service_type: Some(" ".into()),
        };
        assert!(!deltas.is_empty());
        assert_eq!(deltas.description(), Some("Phase 2"));
        assert_eq!(deltas.service_type(), None);
    }

    #[test]
    fn deltas_trim_applied_values() {
        let deltas = TenderDeltas {
            name: Some("  Bridge  ".into()),
            description: None,
            service_type: Some("\tDelivery ".into()),
        };
        assert_eq!(deltas.name(), Some("Bridge"));
        assert_eq!(deltas.service_type(), Some("Delivery"));
    }

    #[test]
    fn deltas_deserialize_camel_case() {
        let deltas: TenderDeltas =
            serde_json::from_str(r#"{"serviceType":"Delivery","name":"Bridge"}"#).unwrap();
        assert_eq!(deltas.service_type(), Some("Delivery"));
        assert_eq!(deltas.name(), Some("Bridge"));
        assert_eq!(deltas.description(), None);
    }
}
