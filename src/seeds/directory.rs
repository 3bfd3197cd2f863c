//! Directory seeding functionality
//!
//! Employees, organizations and responsibility grants are owned by an
//! external directory in production. This module populates them for local
//! development and tests. Every function is idempotent: an existing row with
//! the same natural key is returned instead of inserting a duplicate.

use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::models::organization::OrganizationType;
use crate::models::{employee, organization, organization_responsible};

/// Returns the employee with `username`, creating it when absent
pub async fn seed_employee<C: ConnectionTrait>(
    db: &C,
    username: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<employee::Model> {
    if let Some(existing) = employee::Entity::find()
        .filter(employee::Column::Username.eq(username))
        .one(db)
        .await?
    {
        log::info!("Employee '{}' already exists, skipping", username);
        return Ok(existing);
    }

    let now = Utc::now().fixed_offset();
    let model = employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        first_name: Set(first_name.map(str::to_string)),
        last_name: Set(last_name.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    log::info!("Created employee: {}", username);
    Ok(model)
}

/// Returns the organization named `name`, creating it when absent
pub async fn seed_organization<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: Option<&str>,
    organization_type: OrganizationType,
) -> Result<organization::Model> {
    if let Some(existing) = organization::Entity::find()
        .filter(organization::Column::Name.eq(name))
        .one(db)
        .await?
    {
        log::info!("Organization '{}' already exists, skipping", name);
        return Ok(existing);
    }

    let now = Utc::now().fixed_offset();
    let model = organization::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.map(str::to_string)),
        organization_type: Set(organization_type),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    log::info!("Created organization: {}", name);
    Ok(model)
}

/// Makes `user_id` responsible for `organization_id`
pub async fn grant_responsibility<C: ConnectionTrait>(
    db: &C,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<organization_responsible::Model> {
    if let Some(existing) = organization_responsible::Entity::find()
        .filter(organization_responsible::Column::OrganizationId.eq(organization_id))
        .filter(organization_responsible::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let model = organization_responsible::ActiveModel {
        id: Set(Uuid::new_v4()),
        organization_id: Set(organization_id),
        user_id: Set(user_id),
    }
    .insert(db)
    .await?;

    log::info!(
        "Granted responsibility for organization {} to user {}",
        organization_id,
        user_id
    );
    Ok(model)
}

/// Rows created by [`seed_demo_directory`]
#[derive(Debug, Clone)]
pub struct DemoDirectory {
    pub organization: organization::Model,
    /// Responsible for `organization`
    pub responsible: employee::Model,
    /// Exists but holds no responsibility
    pub outsider: employee::Model,
}

/// Seeds one organization with a responsible employee and an outsider
pub async fn seed_demo_directory<C: ConnectionTrait>(db: &C) -> Result<DemoDirectory> {
    let organization = seed_organization(
        db,
        "Acme Roads",
        Some("Road construction and maintenance"),
        OrganizationType::Llc,
    )
    .await?;
    let responsible = seed_employee(db, "alice", Some("Alice"), Some("Ivanova")).await?;
    let outsider = seed_employee(db, "bob", Some("Bob"), Some("Petrov")).await?;

    grant_responsibility(db, organization.id, responsible.id).await?;

    log::info!("Directory seeding completed successfully");
    Ok(DemoDirectory {
        organization,
        responsible,
        outsider,
    })
}
