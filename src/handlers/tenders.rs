//! # Tender API Handlers
//!
//! Thin HTTP layer over [`TenderService`](crate::service::TenderService).
//! Handlers parse the request, call one service operation and render either
//! the result or the [`ApiError`] derived from the typed failure.

use axum::{
    extract::{
        Path, Query, RawQuery, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::error::{ApiError, unauthorized};
use crate::handlers::types::{
    CreateTenderRequest, EditTenderRequest, ListQuery, TenderResponse, TenderStatusResponse,
    TenderVersionResponse, UpdateStatusQuery, UsernameQuery,
};
use crate::repositories::NewTender;
use crate::server::AppState;

/// Returns the acting username or a 401 when it is absent or blank.
fn require_username(username: Option<String>) -> Result<String, ApiError> {
    username
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| unauthorized(Some("username query parameter is required")))
}

/// List tenders, optionally filtered by service type
#[utoipa::path(
    get,
    path = "/api/tenders",
    params(
        ("limit" = Option<u64>, Query, description = "Maximum number of tenders to return (default 5, max 50)"),
        ("offset" = Option<u64>, Query, description = "Number of tenders to skip"),
        ("service_type" = Option<Vec<String>>, Query, description = "Service type filter; may be repeated")
    ),
    responses(
        (status = 200, description = "Tenders ordered by name", body = [TenderResponse]),
        (status = 400, description = "Invalid pagination parameters", body = ApiError),
        (status = 503, description = "Operation timed out", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn list_tenders(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<TenderResponse>>, ApiError> {
    let query = ListQuery::parse(raw.as_deref(), &state.config)?;
    let tenders = state
        .service
        .list_tenders(query.page, &query.service_types)
        .await?;

    Ok(Json(tenders.into_iter().map(TenderResponse::from).collect()))
}

/// Create a tender on behalf of an organization
#[utoipa::path(
    post,
    path = "/api/tenders/new",
    request_body = CreateTenderRequest,
    responses(
        (status = 201, description = "Tender created at version 1", body = TenderResponse),
        (status = 400, description = "Invalid request body", body = ApiError),
        (status = 401, description = "Creator does not exist", body = ApiError),
        (status = 403, description = "Creator is not responsible for the organization", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn create_tender(
    State(state): State<AppState>,
    payload: Result<Json<CreateTenderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TenderResponse>), ApiError> {
    let Json(request) = payload?;

    let tender = state
        .service
        .create_tender(NewTender {
            name: request.name,
            description: request.description,
            service_type: request.service_type,
            organization_id: request.organization_id,
            creator_username: request.creator_username,
        })
        .await?;

    tracing::info!(tender_id = %tender.id, "Tender created");
    Ok((StatusCode::CREATED, Json(tender.into())))
}

/// List tenders created by the given user
#[utoipa::path(
    get,
    path = "/api/tenders/my",
    params(
        ("username" = String, Query, description = "Creator username"),
        ("limit" = Option<u64>, Query, description = "Maximum number of tenders to return (default 5, max 50)"),
        ("offset" = Option<u64>, Query, description = "Number of tenders to skip")
    ),
    responses(
        (status = 200, description = "Tenders created by the user", body = [TenderResponse]),
        (status = 401, description = "Missing or unknown username", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn list_my_tenders(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<TenderResponse>>, ApiError> {
    let query = ListQuery::parse(raw.as_deref(), &state.config)?;
    let username = require_username(query.username)?;
    let tenders = state
        .service
        .list_user_tenders(query.page, &username)
        .await?;

    Ok(Json(tenders.into_iter().map(TenderResponse::from).collect()))
}

/// Current status of a tender
#[utoipa::path(
    get,
    path = "/api/tenders/{tender_id}/status",
    params(
        ("tender_id" = Uuid, Path, description = "Tender identifier"),
        ("username" = String, Query, description = "Acting username")
    ),
    responses(
        (status = 200, description = "Current status", body = TenderStatusResponse),
        (status = 401, description = "Missing or unknown username", body = ApiError),
        (status = 404, description = "Tender not found", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn get_tender_status(
    State(state): State<AppState>,
    tender_id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UsernameQuery>, QueryRejection>,
) -> Result<Json<TenderStatusResponse>, ApiError> {
    let Path(tender_id) = tender_id?;
    let Query(query) = query?;
    let username = require_username(query.username)?;

    let status = state.service.get_status(tender_id, &username).await?;
    Ok(Json(TenderStatusResponse { status }))
}

/// Change the status of a tender, producing a new version
#[utoipa::path(
    put,
    path = "/api/tenders/{tender_id}/status",
    params(
        ("tender_id" = Uuid, Path, description = "Tender identifier"),
        ("status" = String, Query, description = "Target status: CREATED, PUBLISHED or CLOSED"),
        ("username" = String, Query, description = "Acting username")
    ),
    responses(
        (status = 200, description = "Updated tender", body = TenderResponse),
        (status = 400, description = "Unknown status or disallowed transition", body = ApiError),
        (status = 401, description = "Missing or unknown username", body = ApiError),
        (status = 404, description = "Tender not found", body = ApiError),
        (status = 409, description = "Concurrent write", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn update_tender_status(
    State(state): State<AppState>,
    tender_id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UpdateStatusQuery>, QueryRejection>,
) -> Result<Json<TenderResponse>, ApiError> {
    let Path(tender_id) = tender_id?;
    let Query(query) = query?;
    let username = require_username(query.username)?;
    let status = query.status.unwrap_or_default();

    let tender = state
        .service
        .update_status(tender_id, &status, &username)
        .await?;

    Ok(Json(tender.into()))
}

/// Partially edit a tender, producing a new version
#[utoipa::path(
    patch,
    path = "/api/tenders/{tender_id}/edit",
    params(
        ("tender_id" = Uuid, Path, description = "Tender identifier"),
        ("username" = String, Query, description = "Acting username")
    ),
    request_body = EditTenderRequest,
    responses(
        (status = 200, description = "Updated tender", body = TenderResponse),
        (status = 400, description = "No applicable fields or invalid body", body = ApiError),
        (status = 401, description = "Missing or unknown username", body = ApiError),
        (status = 404, description = "Tender not found", body = ApiError),
        (status = 409, description = "Concurrent write", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn edit_tender(
    State(state): State<AppState>,
    tender_id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UsernameQuery>, QueryRejection>,
    payload: Result<Json<EditTenderRequest>, JsonRejection>,
) -> Result<Json<TenderResponse>, ApiError> {
    let Path(tender_id) = tender_id?;
    let Query(query) = query?;
    let username = require_username(query.username)?;
    let Json(request) = payload?;

    let tender = state
        .service
        .update_partial(tender_id, request.into(), &username)
        .await?;

    Ok(Json(tender.into()))
}

/// Restore the content of an earlier version as a new version
#[utoipa::path(
    put,
    path = "/api/tenders/{tender_id}/rollback/{version}",
    params(
        ("tender_id" = Uuid, Path, description = "Tender identifier"),
        ("version" = i32, Path, description = "Version to restore"),
        ("username" = String, Query, description = "Acting username")
    ),
    responses(
        (status = 200, description = "Tender at its new version", body = TenderResponse),
        (status = 401, description = "Missing or unknown username", body = ApiError),
        (status = 404, description = "Tender or version not found", body = ApiError),
        (status = 409, description = "Concurrent write", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn rollback_tender(
    State(state): State<AppState>,
    path: Result<Path<(Uuid, i32)>, PathRejection>,
    query: Result<Query<UsernameQuery>, QueryRejection>,
) -> Result<Json<TenderResponse>, ApiError> {
    let Path((tender_id, version)) = path?;
    let Query(query) = query?;
    let username = require_username(query.username)?;

    let tender = state
        .service
        .rollback(tender_id, version, &username)
        .await?;

    tracing::info!(
        tender_id = %tender_id,
        restored = version,
        version = tender.version,
        "Tender rolled back"
    );
    Ok(Json(tender.into()))
}

/// Full version history of a tender
#[utoipa::path(
    get,
    path = "/api/tenders/{tender_id}/versions",
    params(
        ("tender_id" = Uuid, Path, description = "Tender identifier"),
        ("username" = String, Query, description = "Acting username")
    ),
    responses(
        (status = 200, description = "Snapshots ordered by version", body = [TenderVersionResponse]),
        (status = 401, description = "Missing or unknown username", body = ApiError),
        (status = 404, description = "Tender not found", body = ApiError)
    ),
    tag = "tenders"
)]
pub async fn list_tender_versions(
    State(state): State<AppState>,
    tender_id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<UsernameQuery>, QueryRejection>,
) -> Result<Json<Vec<TenderVersionResponse>>, ApiError> {
    let Path(tender_id) = tender_id?;
    let Query(query) = query?;
    let username = require_username(query.username)?;

    let history = state.service.history(tender_id, &username).await?;
    Ok(Json(
        history
            .into_iter()
            .map(TenderVersionResponse::from)
            .collect(),
    ))
}
