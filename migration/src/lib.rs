//! Database migrations for the tender service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_09_01_000001_create_employee;
mod m2024_09_01_000002_create_organization;
mod m2024_09_01_000003_create_organization_responsible;
mod m2024_09_01_000004_create_tender;
mod m2024_09_01_000005_create_tender_versions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_09_01_000001_create_employee::Migration),
            Box::new(m2024_09_01_000002_create_organization::Migration),
            Box::new(m2024_09_01_000003_create_organization_responsible::Migration),
            Box::new(m2024_09_01_000004_create_tender::Migration),
            Box::new(m2024_09_01_000005_create_tender_versions::Migration),
        ]
    }
}
