//! Authorization repository
//!
//! Resolves usernames against the employee directory and checks the
//! organization_responsible relation. Works on any [`ConnectionTrait`] so the
//! same checks run on the pool or inside a writer's transaction.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::error::{TenderError, db_err};
use crate::models::employee::{self, Entity as Employee};
use crate::models::organization_responsible::{self, Entity as OrganizationResponsible};

/// Read-only access to employees and their organization grants
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationRepository<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AuthorizationRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Resolves a username to the employee id.
    ///
    /// Fails with `UserNotFound` when no employee has that username.
    pub async fn resolve_user_id(&self, username: &str) -> Result<Uuid, TenderError> {
        let user_id: Option<Uuid> = Employee::find()
            .select_only()
            .column(employee::Column::Id)
            .filter(employee::Column::Username.eq(username))
            .into_tuple()
            .one(self.conn)
            .await
            .map_err(db_err("resolve username"))?;

        user_id.ok_or_else(|| TenderError::UserNotFound {
            username: username.to_string(),
        })
    }

    /// Precondition shared by every tender operation
    pub async fn ensure_user_exists(&self, username: &str) -> Result<(), TenderError> {
        self.resolve_user_id(username).await.map(|_| ())
    }

    /// Whether `username` may act on behalf of `organization_id`.
    ///
    /// An unknown user is an error (`UserNotFound`); a known user without a
    /// grant is `Ok(false)`.
    pub async fn is_authorized(
        &self,
        username: &str,
        organization_id: Uuid,
    ) -> Result<bool, TenderError> {
        let user_id = self.resolve_user_id(username).await?;
        self.is_responsible(user_id, organization_id).await
    }

    pub async fn is_responsible(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<bool, TenderError> {
        let grants = OrganizationResponsible::find()
            .filter(organization_responsible::Column::UserId.eq(user_id))
            .filter(organization_responsible::Column::OrganizationId.eq(organization_id))
            .count(self.conn)
            .await
            .map_err(db_err("check organization responsibility"))?;

        Ok(grants > 0)
    }
}
