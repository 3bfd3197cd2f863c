//! TenderVersion entity model
//!
//! Append-only history of tender snapshots. For a given tender the version
//! numbers run 1, 2, 3, ... without gaps or duplicates, and rows are never
//! updated or deleted.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use super::tender::TenderStatus;

/// Snapshot of a tender's content at one version
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tender_versions")]
pub struct Model {
    /// Monotonic row identifier
    #[sea_orm(primary_key)]
    pub id: i32,

    pub tender_id: Uuid,

    /// Version number this snapshot records
    pub version: i32,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub service_type: String,

    pub status: TenderStatus,

    pub organization_id: Uuid,

    pub creator_username: String,

    /// Timestamp when the snapshot was appended
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tender::Entity",
        from = "Column::TenderId",
        to = "super::tender::Column::Id"
    )]
    Tender,
}

impl Related<super::tender::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether this snapshot carries the same content as the tender row
    pub fn matches(&self, tender: &super::tender::Model) -> bool {
        self.tender_id == tender.id
            && self.name == tender.name
            && self.description == tender.description
            && self.service_type == tender.service_type
            && self.status == tender.status
            && self.organization_id == tender.organization_id
            && self.creator_username == tender.creator_username
    }
}
