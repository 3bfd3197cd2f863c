//! Employee entity model
//!
//! Employees are the identities that act on tenders. The tender core only
//! ever resolves a username to an id, so the model is read-mostly.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

/// Employee entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employee")]
pub struct Model {
    /// Unique identifier for the employee (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login name, unique across the directory
    #[sea_orm(unique)]
    pub username: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    /// Timestamp when the employee was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the employee was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::organization_responsible::Entity")]
    OrganizationResponsible,
}

impl Related<super::organization_responsible::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationResponsible.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
