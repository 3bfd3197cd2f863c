//! # Tender Observability
//!
//! Components of the tender core report what they did through an injected
//! [`TenderObserver`] instead of a process-wide logger. The binary wires in
//! [`TracingObserver`], which turns each notification into a tracing event and
//! a `metrics` sample; tests can pass their own recorder.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, histogram};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ErrorKind, TenderError};

/// Receives notifications from the tender core
pub trait TenderObserver: Send + Sync + fmt::Debug {
    /// A snapshot was appended to the version store as part of a committed write
    fn version_appended(&self, operation: &'static str, tender_id: Uuid, version: i32);

    /// An operation finished successfully
    fn operation_completed(&self, operation: &'static str, elapsed: Duration);

    /// An operation failed; the enclosing transaction has been rolled back
    fn operation_failed(&self, operation: &'static str, error: &TenderError);
}

/// Shared handle passed to repositories and the service
pub type SharedObserver = Arc<dyn TenderObserver>;

/// Observer that emits tracing events and metrics
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn shared() -> SharedObserver {
        Arc::new(TracingObserver)
    }
}

impl TenderObserver for TracingObserver {
    fn version_appended(&self, operation: &'static str, tender_id: Uuid, version: i32) {
        info!(operation, tender_id = %tender_id, version, "Tender version appended");
        counter!("tender_versions_appended_total", "operation" => operation).increment(1);
    }

    fn operation_completed(&self, operation: &'static str, elapsed: Duration) {
        debug!(
            operation,
            elapsed_ms = elapsed.as_millis() as u64,
            "Tender operation completed"
        );
        histogram!("tender_operation_duration_ms", "operation" => operation)
            .record(elapsed.as_secs_f64() * 1000.0);
    }

    fn operation_failed(&self, operation: &'static str, error: &TenderError) {
        let kind = error.kind();
        match kind {
            ErrorKind::StorageFailure | ErrorKind::Timeout | ErrorKind::Conflict => {
                warn!(operation, kind = kind.as_str(), error = %error, "Tender operation failed");
            }
            _ => {
                debug!(operation, kind = kind.as_str(), error = %error, "Tender operation rejected");
            }
        }
        counter!(
            "tender_operation_failures_total",
            "operation" => operation,
            "kind" => kind.as_str()
        )
        .increment(1);
    }
}
