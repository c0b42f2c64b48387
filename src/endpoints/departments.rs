//! Department administration with hierarchy and headcount info.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::error::{AppError, Result};
use crate::application::state::AppState;
use crate::middleware::{AdminOnly, Authenticated, Authorized};
use crate::models::activity_log::{ActivityAction, EntityType};
use crate::models::prelude::*;
use crate::repositories::DepartmentRepository;

pub fn departments_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route(
            "/{department_id}",
            get(get_department)
                .patch(update_department)
                .delete(delete_department),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub code: String,
    pub parent_department_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub code: Option<String>,
    pub parent_department_id: Option<Option<i64>>,
}

#[derive(Debug, Serialize)]
pub struct DepartmentInfo {
    #[serde(flatten)]
    pub department: department::Model,
    pub children: Vec<department::Model>,
    pub staff_count: u64,
    pub student_count: u64,
}

/// GET /api/departments
async fn list_departments(
    Authenticated(_user): Authenticated,
    State(state): State<AppState>,
) -> Result<Json<Vec<department::Model>>> {
    let departments = DepartmentRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(departments))
}

/// GET /api/departments/{department_id} - with hierarchy and headcounts
async fn get_department(
    Authenticated(_user): Authenticated,
    State(state): State<AppState>,
    Path(department_id): Path<i64>,
) -> Result<Json<DepartmentInfo>> {
    let repo = DepartmentRepository::new(state.db.clone());
    let department = repo.find_by_id(department_id).await?;
    let (children, staff_count, student_count) = tokio::try_join!(
        repo.children(department_id),
        repo.staff_count(department_id),
        repo.student_count(department_id),
    )?;

    Ok(Json(DepartmentInfo {
        department,
        children,
        staff_count,
        student_count,
    }))
}

/// POST /api/departments
async fn create_department(
    Authorized(admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Json(body): Json<CreateDepartmentRequest>,
) -> Result<Json<department::Model>> {
    body.validate()?;

    let repo = DepartmentRepository::new(state.db.clone());
    if repo.find_by_name(&body.name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "department already exists: {}",
            body.name
        )));
    }
    if let Some(parent_id) = body.parent_department_id {
        repo.find_by_id(parent_id).await?;
    }

    let now = Utc::now();
    let department = repo
        .create(department::ActiveModel {
            name: Set(body.name),
            code: Set(body.code),
            parent_department_id: Set(body.parent_department_id),
            is_deleted: Set(false),
            deleted_at: Set(None),
            deleted_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::DepartmentCreated,
            EntityType::Department,
            Some(department.id.to_string()),
            Some(admin.id),
            Some(admin.email.clone()),
            Some(serde_json::json!({ "name": department.name })),
        )
        .await
        .ok();

    Ok(Json(department))
}

/// PATCH /api/departments/{department_id}
async fn update_department(
    Authorized(admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(department_id): Path<i64>,
    Json(body): Json<UpdateDepartmentRequest>,
) -> Result<Json<department::Model>> {
    body.validate()?;

    let repo = DepartmentRepository::new(state.db.clone());
    repo.find_by_id(department_id).await?;

    if let Some(Some(parent_id)) = body.parent_department_id {
        if parent_id == department_id {
            return Err(AppError::BadRequest(
                "A department cannot be its own parent".to_string(),
            ));
        }
        repo.find_by_id(parent_id).await?;
    }

    let mut changes = department::ActiveModel {
        ..Default::default()
    };
    if let Some(name) = body.name {
        changes.name = Set(name);
    }
    if let Some(code) = body.code {
        changes.code = Set(code);
    }
    if let Some(parent) = body.parent_department_id {
        changes.parent_department_id = Set(parent);
    }
    changes.updated_at = Set(Utc::now());

    let department = repo.update(department_id, changes).await?;

    state
        .activity
        .log_success(
            ActivityAction::DepartmentUpdated,
            EntityType::Department,
            Some(department.id.to_string()),
            Some(admin.id),
            Some(admin.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(department))
}

/// DELETE /api/departments/{department_id} - soft delete, refuses while occupied
async fn delete_department(
    Authorized(admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(department_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let repo = DepartmentRepository::new(state.db.clone());
    repo.find_by_id(department_id).await?;

    let (staff, students) = tokio::try_join!(
        repo.staff_count(department_id),
        repo.student_count(department_id),
    )?;
    if staff + students > 0 {
        return Err(AppError::Conflict(
            "Department still has members".to_string(),
        ));
    }
    if !repo.children(department_id).await?.is_empty() {
        return Err(AppError::Conflict(
            "Department still has child departments".to_string(),
        ));
    }

    repo.soft_delete(department_id, Some(admin.id)).await?;

    state
        .activity
        .log_success(
            ActivityAction::DepartmentDeleted,
            EntityType::Department,
            Some(department_id.to_string()),
            Some(admin.id),
            Some(admin.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(serde_json::json!({ "detail": "Department deleted" })))
}
