//! # Tender Service
//!
//! Entry point over the tender repositories used by the HTTP layer. It validates
//! primitive inputs, runs every operation under the configured deadline and
//! reports outcomes to the injected observer.
//!
//! When the deadline elapses the operation's future is dropped. Any open
//! transaction is dropped with it and rolled back, so a timed-out write is
//! never partially visible.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{TenderError, db_err};
use crate::models::tender::{self, TenderStatus};
use crate::models::tender_version;
use crate::observability::SharedObserver;
use crate::repositories::{
    NewTender, Page, RollbackRepository, TenderDeltas, TenderQueryRepository, TenderRepository,
};

/// Column widths of the tender table
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_SERVICE_TYPE_LEN: usize = 50;
pub const MAX_USERNAME_LEN: usize = 50;

#[derive(Debug, Clone)]
pub struct TenderService {
    db: Arc<DatabaseConnection>,
    writer: TenderRepository,
    rollbacks: RollbackRepository,
    reader: TenderQueryRepository,
    observer: SharedObserver,
    deadline: Duration,
}

impl TenderService {
    pub fn new(db: Arc<DatabaseConnection>, observer: SharedObserver, deadline: Duration) -> Self {
        Self {
            writer: TenderRepository::new(db.clone(), observer.clone()),
            rollbacks: RollbackRepository::new(db.clone(), observer.clone()),
            reader: TenderQueryRepository::new(db.clone()),
            db,
            observer,
            deadline,
        }
    }

    pub fn from_config(
        db: Arc<DatabaseConnection>,
        observer: SharedObserver,
        config: &AppConfig,
    ) -> Self {
        Self::new(db, observer, config.operation_timeout())
    }

    pub async fn create_tender(&self, new: NewTender) -> Result<tender::Model, TenderError> {
        self.run("create_tender", async {
            let new = validate_new_tender(new)?;
            self.writer.create(new).await
        })
        .await
    }

    pub async fn list_tenders(
        &self,
        page: Page,
        service_types: &[String],
    ) -> Result<Vec<tender::Model>, TenderError> {
        self.run("list_tenders", self.reader.list(page, service_types))
            .await
    }

    pub async fn list_user_tenders(
        &self,
        page: Page,
        username: &str,
    ) -> Result<Vec<tender::Model>, TenderError> {
        self.run("list_user_tenders", self.reader.list_by_creator(page, username))
            .await
    }

    pub async fn get_tender(&self, tender_id: Uuid) -> Result<tender::Model, TenderError> {
        self.run("get_tender", self.reader.get(tender_id)).await
    }

    pub async fn get_status(
        &self,
        tender_id: Uuid,
        username: &str,
    ) -> Result<TenderStatus, TenderError> {
        self.run("get_status", self.reader.get_status(tender_id, username))
            .await
    }

    /// Parses `new_status` and applies it.
    ///
    /// A value outside the status set fails with `InvalidStatus` before the
    /// store is touched.
    pub async fn update_status(
        &self,
        tender_id: Uuid,
        new_status: &str,
        username: &str,
    ) -> Result<tender::Model, TenderError> {
        self.run("update_status", async {
            let status = new_status
                .parse::<TenderStatus>()
                .map_err(|err| TenderError::InvalidStatus {
                    message: err.to_string(),
                })?;
            self.writer.update_status(tender_id, status, username).await
        })
        .await
    }

    pub async fn update_partial(
        &self,
        tender_id: Uuid,
        deltas: TenderDeltas,
        username: &str,
    ) -> Result<tender::Model, TenderError> {
        self.run("update_partial", async {
            validate_deltas(&deltas)?;
            self.writer.update_partial(tender_id, &deltas, username).await
        })
        .await
    }

    pub async fn rollback(
        &self,
        tender_id: Uuid,
        target_version: i32,
        username: &str,
    ) -> Result<tender::Model, TenderError> {
        self.run(
            "rollback",
            self.rollbacks.rollback(tender_id, target_version, username),
        )
        .await
    }

    pub async fn history(
        &self,
        tender_id: Uuid,
        username: &str,
    ) -> Result<Vec<tender_version::Model>, TenderError> {
        self.run("history", self.reader.history(tender_id, username))
            .await
    }

    /// Round-trips the database connection
    pub async fn ping(&self) -> Result<(), TenderError> {
        self.run("ping", async {
            self.db.ping().await.map_err(db_err("ping database"))
        })
        .await
    }

    async fn run<T, F>(&self, operation: &'static str, future: F) -> Result<T, TenderError>
    where
        F: Future<Output = Result<T, TenderError>>,
    {
        let started = Instant::now();
        let result = match tokio::time::timeout(self.deadline, future).await {
            Ok(result) => result,
            Err(_) => Err(TenderError::Timeout {
                operation,
                timeout_ms: self.deadline.as_millis() as u64,
            }),
        };

        match &result {
            Ok(_) => self.observer.operation_completed(operation, started.elapsed()),
            Err(error) => self.observer.operation_failed(operation, error),
        }
        result
    }
}

fn required(
    field: &'static str,
    value: String,
    max_len: usize,
) -> Result<String, TenderError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(TenderError::Validation {
            field,
            message: "must not be blank".to_string(),
        });
    }
    check_len(field, &value, max_len)?;
    Ok(value)
}

fn check_len(field: &'static str, value: &str, max_len: usize) -> Result<(), TenderError> {
    if value.chars().count() > max_len {
        return Err(TenderError::Validation {
            field,
            message: format!("must be at most {max_len} characters"),
        });
    }
    Ok(())
}

fn validate_new_tender(new: NewTender) -> Result<NewTender, TenderError> {
    Ok(NewTender {
        name: required("name", new.name, MAX_NAME_LEN)?,
        description: new.description.trim().to_string(),
        service_type: required("serviceType", new.service_type, MAX_SERVICE_TYPE_LEN)?,
        organization_id: new.organization_id,
        creator_username: required("creatorUsername", new.creator_username, MAX_USERNAME_LEN)?,
    })
}

fn validate_deltas(deltas: &TenderDeltas) -> Result<(), TenderError> {
    if let Some(name) = deltas.name() {
        check_len("name", name, MAX_NAME_LEN)?;
    }
    if let Some(service_type) = deltas.service_type() {
        check_len("serviceType", service_type, MAX_SERVICE_TYPE_LEN)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::observability::TenderObserver;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        failures: Mutex<Vec<(&'static str, ErrorKind)>>,
    }

    impl TenderObserver for Recorder {
        fn version_appended(&self, _: &'static str, _: Uuid, _: i32) {}
        fn operation_completed(&self, _: &'static str, _: Duration) {}
        fn operation_failed(&self, operation: &'static str, error: &TenderError) {
            self.failures
                .lock()
                .unwrap()
                .push((operation, error.kind()));
        }
    }

    fn service_with(deadline: Duration) -> (TenderService, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let service = TenderService::new(
            Arc::new(DatabaseConnection::default()),
            recorder.clone(),
            deadline,
        );
        (service, recorder)
    }

    #[tokio::test]
    async fn deadline_turns_into_timeout() {
        let (service, recorder) = service_with(Duration::from_millis(10));

        let result: Result<(), TenderError> = service
            .run("stalled", std::future::pending())
            .await;

        assert!(matches!(
            result,
            Err(TenderError::Timeout {
                operation: "stalled",
                timeout_ms: 10
            })
        ));
        assert_eq!(
            recorder.failures.lock().unwrap().as_slice(),
            &[("stalled", ErrorKind::Timeout)]
        );
    }

    #[tokio::test]
    async fn unknown_status_is_rejected_before_the_store() {
        let (service, recorder) = service_with(Duration::from_secs(1));

        let err = service
            .update_status(Uuid::new_v4(), "ARCHIVED", "alice")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidStatus);
        assert_eq!(
            recorder.failures.lock().unwrap().as_slice(),
            &[("update_status", ErrorKind::InvalidStatus)]
        );
    }

    #[test]
    fn new_tender_fields_are_trimmed_and_checked() {
        let new = NewTender {
            name: "  Road Repair ".into(),
            description: " Phase 1 ".into(),
            service_type: "Construction".into(),
            organization_id: Uuid::new_v4(),
            creator_username: "alice".into(),
        };
        let validated = validate_new_tender(new).unwrap();
        assert_eq!(validated.name, "Road Repair");
        assert_eq!(validated.description, "Phase 1");

        let blank = NewTender {
            name: "   ".into(),
            description: String::new(),
            service_type: "Construction".into(),
            organization_id: Uuid::new_v4(),
            creator_username: "alice".into(),
        };
        assert!(matches!(
            validate_new_tender(blank),
            Err(TenderError::Validation { field: "name", .. })
        ));
    }

    #[test]
    fn overlong_delta_is_rejected() {
        let deltas = TenderDeltas {
            name: Some("x".repeat(MAX_NAME_LEN + 1)),
            ..TenderDeltas::default()
        };
        assert!(matches!(
            validate_deltas(&deltas),
            Err(TenderError::Validation { field: "name", .. })
        ));
    }
}
