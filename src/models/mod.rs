//! # Data Models
//!
//! This module contains the SeaORM entities used by the tender service.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod employee;
pub mod organization;
pub mod organization_responsible;
pub mod tender;
pub mod tender_version;

pub use employee::Entity as Employee;
pub use organization::Entity as Organization;
pub use organization_responsible::Entity as OrganizationResponsible;
pub use tender::{Entity as Tender, TenderStatus};
pub use tender_version::Entity as TenderVersion;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "tenders".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
