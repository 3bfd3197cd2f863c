//! # Error Handling
//!
//! Two layers live here. [`TenderError`] is the typed failure returned by the
//! tender core; every variant carries an [`ErrorKind`] tag that is decided at
//! the point the condition is detected. [`ApiError`] is the transport
//! rendering: a problem+json body with trace ID propagation.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, RuntimeErr};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::telemetry;

/// Classification of a [`TenderError`] visible to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    VersionNotFound,
    UserNotFound,
    NotAuthorized,
    InvalidStatus,
    NoFieldsToUpdate,
    Validation,
    Conflict,
    Timeout,
    StorageFailure,
}

impl ErrorKind {
    /// Stable snake_case label, used for metrics and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::VersionNotFound => "version_not_found",
            ErrorKind::UserNotFound => "user_not_found",
            ErrorKind::NotAuthorized => "not_authorized",
            ErrorKind::InvalidStatus => "invalid_status",
            ErrorKind::NoFieldsToUpdate => "no_fields_to_update",
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Timeout => "timeout",
            ErrorKind::StorageFailure => "storage_failure",
        }
    }
}

/// Failure of a tender core operation
#[derive(Debug, Error)]
pub enum TenderError {
    #[error("tender {tender_id} not found")]
    TenderNotFound { tender_id: Uuid },

    #[error("version {version} of tender {tender_id} not found")]
    VersionNotFound { tender_id: Uuid, version: i32 },

    #[error("user '{username}' not found")]
    UserNotFound { username: String },

    #[error("user '{username}' is not responsible for organization {organization_id}")]
    NotAuthorized {
        username: String,
        organization_id: Uuid,
    },

    #[error("invalid status: {message}")]
    InvalidStatus { message: String },

    #[error("no fields to update")]
    NoFieldsToUpdate,

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{operation} lost a concurrent write race")]
    Conflict {
        operation: &'static str,
        #[source]
        source: Option<DbErr>,
    },

    #[error("{operation} did not finish within {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("{operation} failed: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: DbErr,
    },
}

impl TenderError {
    /// Wrap a store error with the operation that produced it.
    ///
    /// Constraint violations are classified from the driver's structured
    /// error code: a CHECK violation becomes `InvalidStatus` and a unique
    /// violation becomes `Conflict`.
    pub fn storage(operation: &'static str, source: DbErr) -> Self {
        if is_check_violation(&source) {
            return TenderError::InvalidStatus {
                message: format!("{operation} was rejected by a store constraint"),
            };
        }
        if is_unique_violation(&source) {
            return TenderError::Conflict {
                operation,
                source: Some(source),
            };
        }
        TenderError::Storage { operation, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TenderError::TenderNotFound { .. } => ErrorKind::NotFound,
            TenderError::VersionNotFound { .. } => ErrorKind::VersionNotFound,
            TenderError::UserNotFound { .. } => ErrorKind::UserNotFound,
            TenderError::NotAuthorized { .. } => ErrorKind::NotAuthorized,
            TenderError::InvalidStatus { .. } => ErrorKind::InvalidStatus,
            TenderError::NoFieldsToUpdate => ErrorKind::NoFieldsToUpdate,
            TenderError::Validation { .. } => ErrorKind::Validation,
            TenderError::Conflict { .. } => ErrorKind::Conflict,
            TenderError::Timeout { .. } => ErrorKind::Timeout,
            TenderError::Storage { .. } => ErrorKind::StorageFailure,
        }
    }
}

/// Shorthand used by the repositories: `.map_err(db_err("load tender"))`
pub(crate) fn db_err(operation: &'static str) -> impl FnOnce(DbErr) -> TenderError {
    move |source| TenderError::storage(operation, source)
}

fn database_error(error: &DbErr) -> Option<&(dyn sea_orm::sqlx::error::DatabaseError + 'static)> {
    match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err.as_database_error(),
        _ => None,
    }
}

fn is_unique_violation(error: &DbErr) -> bool {
    const PG_UNIQUE: &str = "23505";
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    let Some(db_error) = database_error(error) else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    db_error.code().is_some_and(|code| {
        let code_str = code.as_ref();
        code_str == PG_UNIQUE || SQLITE_DUPLICATE_CODES.contains(&code_str)
    })
}

fn is_check_violation(error: &DbErr) -> bool {
    const PG_CHECK: &str = "23514";
    const SQLITE_CONSTRAINT_CHECK: &str = "275";

    let Some(db_error) = database_error(error) else {
        return false;
    };

    if db_error.is_check_violation() {
        return true;
    }

    db_error.code().is_some_and(|code| {
        let code_str = code.as_ref();
        code_str == PG_CHECK || code_str == SQLITE_CONSTRAINT_CHECK
    })
}

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Suggested retry delay in seconds (optional)
    pub retry_after: Option<u64>,
    /// Correlation trace ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            retry_after: None,
            trace_id: Self::current_trace_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Set retry after delay
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Extract the request trace ID (falls back to a generated correlation ID)
    fn current_trace_id() -> Option<Box<str>> {
        telemetry::current_trace_id()
            .map(|trace_id| trace_id.into_boxed_str())
            .or_else(|| {
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

/// Standard error types with predefined status codes
#[derive(Debug, Error)]
pub enum ErrorType {
    #[error("Not Found")]
    NotFound,
    #[error("Service Unavailable")]
    ServiceUnavailable,
}

impl ErrorType {
    /// Get the appropriate HTTP status code for this error type
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorType::NotFound => StatusCode::NOT_FOUND,
            ErrorType::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code string for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorType::NotFound => "NOT_FOUND",
            ErrorType::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        if let Some(retry_after) = self.retry_after
            && let Ok(header_value) = HeaderValue::from_str(&retry_after.to_string())
        {
            headers.insert("retry-after", header_value);
        }

        (self.status, headers, axum::Json(self)).into_response()
    }
}

// Error mappers for common sources

impl From<ErrorType> for ApiError {
    fn from(error_type: ErrorType) -> Self {
        Self::new(
            error_type.status_code(),
            error_type.error_code(),
            &error_type.to_string(),
        )
    }
}

impl From<TenderError> for ApiError {
    fn from(error: TenderError) -> Self {
        let message = error.to_string();
        match &error {
            TenderError::UserNotFound { username } => {
                ApiError::new(StatusCode::UNAUTHORIZED, "USER_NOT_FOUND", &message)
                    .with_details(json!({ "username": username }))
            }
            TenderError::NotAuthorized {
                organization_id, ..
            } => ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", &message)
                .with_details(json!({ "organization_id": organization_id })),
            TenderError::TenderNotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "TENDER_NOT_FOUND", &message)
            }
            TenderError::VersionNotFound { version, .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "VERSION_NOT_FOUND", &message)
                    .with_details(json!({ "version": version }))
            }
            TenderError::InvalidStatus { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_STATUS", &message)
            }
            TenderError::NoFieldsToUpdate => {
                ApiError::new(StatusCode::BAD_REQUEST, "NO_FIELDS_TO_UPDATE", &message)
            }
            TenderError::Validation { field, .. } => {
                validation_error(&message, json!({ "field": field }))
            }
            TenderError::Conflict { .. } => {
                tracing::warn!(error = ?error, "Concurrent tender write rejected");
                ApiError::new(StatusCode::CONFLICT, "CONFLICT", &message).with_retry_after(1)
            }
            TenderError::Timeout { .. } => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "TIMEOUT", &message)
                    .with_retry_after(1)
            }
            TenderError::Storage { .. } => {
                tracing::error!(error = ?error, "Tender storage failure");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", &message)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            &format!("Invalid query string: {}", rejection.body_text()),
        )
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            &format!("Invalid path parameter: {}", rejection.body_text()),
        )
    }
}

/// Create an unauthorized error response
pub fn unauthorized(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
}

/// Create a validation error with field details
pub fn validation_error(message: &str, field_errors: serde_json::Value) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_details(field_errors)
}
