//! Migration to create the tender table.
//!
//! One row per tender holding its current state. The status column is
//! constrained to the lifecycle values understood by the service and the
//! version counter starts at 1.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tender::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tender::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tender::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Tender::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Tender::Status)
                            .string_len(16)
                            .not_null()
                            .default("CREATED")
                            .check(
                                Expr::col(Tender::Status)
                                    .is_in(["CREATED", "PUBLISHED", "CLOSED"]),
                            ),
                    )
                    .col(ColumnDef::new(Tender::ServiceType).string_len(50).not_null())
                    .col(ColumnDef::new(Tender::OrganizationId).uuid().not_null())
                    .col(
                        ColumnDef::new(Tender::CreatorUsername)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tender::Version)
                            .integer()
                            .not_null()
                            .default(1)
                            .check(Expr::col(Tender::Version).gte(1)),
                    )
                    .col(
                        ColumnDef::new(Tender::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tender_organization_id")
                            .from(Tender::Table, Tender::OrganizationId)
                            .to(Organization::Table, Organization::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tender_service_type")
                    .table(Tender::Table)
                    .col(Tender::ServiceType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tender_creator_username")
                    .table(Tender::Table)
                    .col(Tender::CreatorUsername)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_tender_service_type").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_tender_creator_username").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Tender::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tender {
    Table,
    Id,
    Name,
    Description,
    Status,
    ServiceType,
    OrganizationId,
    CreatorUsername,
    Version,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Organization {
    Table,
    Id,
}
