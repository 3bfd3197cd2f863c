//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Tenders API.

use axum::{extract::State, response::Json};

use crate::error::{ApiError, ErrorType};
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod tenders;
pub mod types;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness probe backed by a database round-trip
#[utoipa::path(
    get,
    path = "/api/ping",
    responses(
        (status = 200, description = "Service and database are reachable", body = String, example = "ok"),
        (status = 503, description = "Database unreachable", body = ApiError)
    ),
    tag = "health"
)]
pub async fn ping(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.service.ping().await.map_err(|err| {
        tracing::warn!(error = %err, "Ping failed");
        ApiError::from(ErrorType::ServiceUnavailable)
    })?;
    Ok("ok")
}
