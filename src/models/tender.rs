//! Tender entity model
//!
//! One row per tender holding its current state. The `version` column always
//! equals the highest snapshot number recorded for the tender in
//! `tender_versions`, and the row content equals that snapshot.

use std::fmt;
use std::str::FromStr;

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of a tender
///
/// The allowed moves between statuses are:
///
/// | from        | to                       |
/// |-------------|--------------------------|
/// | `CREATED`   | `PUBLISHED`, `CLOSED`    |
/// | `PUBLISHED` | `CLOSED`, `CREATED`      |
/// | `CLOSED`    | `PUBLISHED`              |
///
/// Staying on the same status is not a transition.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TenderStatus {
    #[sea_orm(string_value = "CREATED")]
    Created,
    #[sea_orm(string_value = "PUBLISHED")]
    Published,
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

/// Returned when a string does not name a [`TenderStatus`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tender status '{0}'")]
pub struct UnknownTenderStatus(pub String);

impl TenderStatus {
    /// Status assigned to every new tender
    pub const INITIAL: TenderStatus = TenderStatus::Created;

    pub fn as_str(&self) -> &'static str {
        match self {
            TenderStatus::Created => "CREATED",
            TenderStatus::Published => "PUBLISHED",
            TenderStatus::Closed => "CLOSED",
        }
    }

    /// Whether a tender currently in `self` may move to `next`
    pub fn can_transition_to(&self, next: TenderStatus) -> bool {
        matches!(
            (self, next),
            (TenderStatus::Created, TenderStatus::Published)
                | (TenderStatus::Created, TenderStatus::Closed)
                | (TenderStatus::Published, TenderStatus::Closed)
                | (TenderStatus::Published, TenderStatus::Created)
                | (TenderStatus::Closed, TenderStatus::Published)
        )
    }
}

impl fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenderStatus {
    type Err = UnknownTenderStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "CREATED" => Ok(TenderStatus::Created),
            "PUBLISHED" => Ok(TenderStatus::Published),
            "CLOSED" => Ok(TenderStatus::Closed),
            _ => Err(UnknownTenderStatus(value.to_string())),
        }
    }
}

/// Tender entity representing the current state of a procurement request
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tender")]
pub struct Model {
    /// Unique identifier for the tender (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Current lifecycle status
    pub status: TenderStatus,

    /// Free-form service category used for filtering (e.g. Construction)
    pub service_type: String,

    /// Organization on whose behalf the tender was created
    pub organization_id: Uuid,

    /// Username of the employee that created the tender
    pub creator_username: String,

    /// Current version number, starting at 1
    pub version: i32,

    /// Timestamp when the tender was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    #[sea_orm(has_many = "super::tender_version::Entity")]
    TenderVersion,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::tender_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenderVersion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
