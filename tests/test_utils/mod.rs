//! Test utilities for database testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations, seeding the directory tables and observing the tender
//! core from tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tenders::error::{ErrorKind, TenderError};
use tenders::models::tender;
use tenders::observability::TenderObserver;
use tenders::repositories::{NewTender, TenderVersionRepository};
use tenders::seeds::{DemoDirectory, seed_demo_directory};
use tenders::service::TenderService;
use uuid::Uuid;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// SQLite in-memory databases live on a single connection, so every
/// transaction in a test serializes on it.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Database plus the demo directory (organization, `alice` responsible, `bob` outsider).
pub async fn setup_seeded_db() -> Result<(Arc<DatabaseConnection>, DemoDirectory)> {
    let db = setup_test_db().await?;
    let directory = seed_demo_directory(&db).await?;
    Ok((Arc::new(db), directory))
}

/// Builds a service with a recording observer and the given deadline.
pub fn service_with_recorder(
    db: Arc<DatabaseConnection>,
    deadline: Duration,
) -> (TenderService, Arc<RecordingObserver>) {
    let recorder = Arc::new(RecordingObserver::default());
    let service = TenderService::new(db, recorder.clone(), deadline);
    (service, recorder)
}

/// The reference tender used by most scenarios.
pub fn road_repair(directory: &DemoDirectory) -> NewTender {
    NewTender {
        name: "Road Repair".to_string(),
        description: "Resurfacing of the ring road".to_string(),
        service_type: "Construction".to_string(),
        organization_id: directory.organization.id,
        creator_username: directory.responsible.username.clone(),
    }
}

/// Asserts the row/history invariant: the row's version equals the number of
/// snapshots and the highest snapshot version, and the row matches that snapshot.
pub async fn assert_history_consistent(db: &DatabaseConnection, tender: &tender::Model) {
    let versions = TenderVersionRepository::new(db);
    let count = versions.count(tender.id).await.unwrap();
    let max = versions.max_version(tender.id).await.unwrap();

    assert_eq!(count, tender.version as u64, "snapshot count");
    assert_eq!(max, Some(tender.version), "highest snapshot");

    let latest = versions
        .find(tender.id, tender.version)
        .await
        .unwrap()
        .expect("latest snapshot");
    assert!(latest.matches(tender), "row matches latest snapshot");
}

/// Observer that records every notification for assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub appended: Mutex<Vec<(&'static str, Uuid, i32)>>,
    pub completed: Mutex<Vec<&'static str>>,
    pub failed: Mutex<Vec<(&'static str, ErrorKind)>>,
}

impl RecordingObserver {
    pub fn appended(&self) -> Vec<(&'static str, Uuid, i32)> {
        self.appended.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<(&'static str, ErrorKind)> {
        self.failed.lock().unwrap().clone()
    }
}

impl TenderObserver for RecordingObserver {
    fn version_appended(&self, operation: &'static str, tender_id: Uuid, version: i32) {
        self.appended
            .lock()
            .unwrap()
            .push((operation, tender_id, version));
    }

    fn operation_completed(&self, operation: &'static str, _elapsed: Duration) {
        self.completed.lock().unwrap().push(operation);
    }

    fn operation_failed(&self, operation: &'static str, error: &TenderError) {
        self.failed.lock().unwrap().push((operation, error.kind()));
    }
}
