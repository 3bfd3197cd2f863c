//! Organization entity model
//!
//! Organizations own tenders. Their legal form is limited to the values of
//! [`OrganizationType`], which the schema also enforces with a CHECK constraint.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Legal form of an organization
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum OrganizationType {
    /// Individual entrepreneur
    #[sea_orm(string_value = "IE")]
    #[serde(rename = "IE")]
    Ie,
    /// Limited liability company
    #[sea_orm(string_value = "LLC")]
    #[serde(rename = "LLC")]
    Llc,
    /// Joint-stock company
    #[sea_orm(string_value = "JSC")]
    #[serde(rename = "JSC")]
    Jsc,
}

/// Organization entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organization")]
pub struct Model {
    /// Unique identifier for the organization (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name of the organization
    pub name: String,

    pub description: Option<String>,

    /// Legal form (IE, LLC or JSC)
    #[sea_orm(column_name = "type")]
    pub organization_type: OrganizationType,

    /// Timestamp when the organization was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the organization was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::organization_responsible::Entity")]
    OrganizationResponsible,
    #[sea_orm(has_many = "super::tender::Entity")]
    Tender,
}

impl Related<super::organization_responsible::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationResponsible.def()
    }
}

impl Related<super::tender::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
