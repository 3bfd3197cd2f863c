//! Migration to create the tender_versions table.
//!
//! Append-only history of tender snapshots. The unique index on
//! `(tender_id, version)` guarantees that no version number is ever written
//! twice for the same tender, even if two writers race past the row lock.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TenderVersions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenderVersions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TenderVersions::TenderId).uuid().not_null())
                    .col(
                        ColumnDef::new(TenderVersions::Version)
                            .integer()
                            .not_null()
                            .check(Expr::col(TenderVersions::Version).gte(1)),
                    )
                    .col(ColumnDef::new(TenderVersions::Name).string_len(100).not_null())
                    .col(ColumnDef::new(TenderVersions::Description).text().not_null())
                    .col(
                        ColumnDef::new(TenderVersions::ServiceType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenderVersions::Status)
                            .string_len(16)
                            .not_null()
                            .check(
                                Expr::col(TenderVersions::Status)
                                    .is_in(["CREATED", "PUBLISHED", "CLOSED"]),
                            ),
                    )
                    .col(
                        ColumnDef::new(TenderVersions::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenderVersions::CreatorUsername)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TenderVersions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tender_versions_tender_id")
                            .from(TenderVersions::Table, TenderVersions::TenderId)
                            .to(Tender::Table, Tender::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tender_versions_tender_version")
                    .table(TenderVersions::Table)
                    .col(TenderVersions::TenderId)
                    .col(TenderVersions::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tender_versions_tender_version")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TenderVersions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenderVersions {
    Table,
    Id,
    TenderId,
    Version,
    Name,
    Description,
    ServiceType,
    Status,
    OrganizationId,
    CreatorUsername,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tender {
    Table,
    Id,
}
