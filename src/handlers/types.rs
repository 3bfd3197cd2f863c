//! # Common API Types
//!
//! Request and response bodies shared by the tender endpoints, and the query
//! string parsing used by the list endpoints.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, validation_error};
use crate::models::tender::{self, TenderStatus};
use crate::models::tender_version;
use crate::repositories::{Page, TenderDeltas};

/// Current state of a tender
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenderResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Road Repair")]
    pub name: String,
    #[schema(example = "Resurfacing of the ring road")]
    pub description: String,
    pub status: TenderStatus,
    #[schema(example = "Construction")]
    pub service_type: String,
    #[schema(example = 1)]
    pub version: i32,
    #[schema(example = "2024-09-01T10:30:00Z")]
    pub created_at: DateTime<FixedOffset>,
}

impl From<tender::Model> for TenderResponse {
    fn from(model: tender::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            status: model.status,
            service_type: model.service_type,
            version: model.version,
            created_at: model.created_at,
        }
    }
}

/// One snapshot from a tender's history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenderVersionResponse {
    pub tender_id: Uuid,
    #[schema(example = 2)]
    pub version: i32,
    pub name: String,
    pub description: String,
    pub service_type: String,
    pub status: TenderStatus,
    pub organization_id: Uuid,
    pub creator_username: String,
    pub created_at: DateTime<FixedOffset>,
}

impl From<tender_version::Model> for TenderVersionResponse {
    fn from(model: tender_version::Model) -> Self {
        Self {
            tender_id: model.tender_id,
            version: model.version,
            name: model.name,
            description: model.description,
            service_type: model.service_type,
            status: model.status,
            organization_id: model.organization_id,
            creator_username: model.creator_username,
            created_at: model.created_at,
        }
    }
}

/// Request payload for creating a tender
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenderRequest {
    #[schema(example = "Road Repair")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "Resurfacing of the ring road")]
    pub description: String,
    #[schema(example = "Construction")]
    pub service_type: String,
    pub organization_id: Uuid,
    #[schema(example = "alice")]
    pub creator_username: String,
}

/// Partial edit of a tender; absent or blank fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditTenderRequest {
    #[schema(example = "Road Repair, phase 2")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "Delivery")]
    pub service_type: Option<String>,
}

impl From<EditTenderRequest> for TenderDeltas {
    fn from(request: EditTenderRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            service_type: request.service_type,
        }
    }
}

/// Status lookup response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TenderStatusResponse {
    pub status: TenderStatus,
}

/// Acting user, required by every tender endpoint except creation and listing
#[derive(Debug, Clone, Deserialize)]
pub struct UsernameQuery {
    /// Username of the acting employee
    pub username: Option<String>,
}

/// Parameters of `PUT /api/tenders/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusQuery {
    /// Target status (CREATED, PUBLISHED or CLOSED)
    pub status: Option<String>,
    /// Username of the acting employee
    pub username: Option<String>,
}

/// Parsed parameters of the list endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Page,
    pub service_types: Vec<String>,
    pub username: Option<String>,
}

impl ListQuery {
    /// Parses a raw query string.
    ///
    /// `service_type` may be repeated. `limit` defaults to the configured
    /// page size and is clamped to the configured maximum.
    pub fn parse(raw: Option<&str>, config: &AppConfig) -> Result<Self, ApiError> {
        let mut limit = None;
        let mut offset = None;
        let mut service_types = Vec::new();
        let mut username = None;

        for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "limit" => limit = Some(parse_number("limit", &value)?),
                "offset" => offset = Some(parse_number("offset", &value)?),
                "service_type" if !value.trim().is_empty() => {
                    service_types.push(value.trim().to_string())
                }
                "username" if !value.trim().is_empty() => {
                    username = Some(value.trim().to_string())
                }
                _ => {}
            }
        }

        let limit = limit
            .unwrap_or(config.default_page_limit)
            .clamp(1, config.max_page_limit);

        Ok(Self {
            page: Page {
                limit,
                offset: offset.unwrap_or(0),
            },
            service_types,
            username,
        })
    }
}

fn parse_number(field: &str, value: &str) -> Result<u64, ApiError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|number| *number <= Page::MAX_WINDOW)
        .ok_or_else(|| {
            validation_error(
                &format!("{field} must be an integer between 0 and {}", Page::MAX_WINDOW),
                serde_json::json!({ "field": field, "value": value }),
            )
        })
}
