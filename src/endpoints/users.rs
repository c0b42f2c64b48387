//! User administration and the current-user endpoint.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::error::{AppError, Result};
use crate::application::state::AppState;
use crate::middleware::{AdminOnly, Authenticated, Authorized};
use crate::models::activity_log::{ActivityAction, EntityType};
use crate::models::prelude::*;
use crate::models::user::{UserRole, UserStatus};
use crate::repositories::{Page, TokenRepository, UserRepository};
use crate::services::security;

pub fn users_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/me", get(get_current_user))
        .route(
            "/{user_id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub role: Option<String>,
    pub department_id: Option<i64>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: String,
    pub department_id: Option<i64>,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub phone: Option<String>,
    pub student_details: Option<serde_json::Value>,
    pub staff_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub department_id: Option<Option<i64>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub student_details: Option<serde_json::Value>,
    pub staff_details: Option<serde_json::Value>,
    pub preferences: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: user::Model,
    pub profile: Option<profile::Model>,
}

/// GET /api/users - admin listing with filters
async fn list_users(
    Authorized(_admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<user::Model>>> {
    let mut cond = Condition::all();
    if let Some(role) = &params.role {
        cond = cond.add(user::Column::Role.eq(role.clone()));
    }
    if let Some(department_id) = params.department_id {
        cond = cond.add(user::Column::DepartmentId.eq(department_id));
    }
    if let Some(q) = &params.q {
        cond = cond.add(user::Column::Email.like(format!("%{}%", q)));
    }

    let page = UserRepository::new(state.db.clone())
        .paginate(cond, params.page.unwrap_or(1), params.per_page.unwrap_or(20))
        .await?;
    Ok(Json(page))
}

/// POST /api/users - create a user with its profile (one transaction)
async fn create_user(
    Authorized(admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<UserWithProfile>> {
    body.validate()?;

    let role = UserRole::parse(&body.role)
        .ok_or_else(|| AppError::BadRequest(format!("unknown role: {}", body.role)))?;

    let users = UserRepository::new(state.db.clone());
    if users.find_by_email(&body.email).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "email already registered: {}",
            body.email
        )));
    }

    let now = Utc::now();
    let user = user::ActiveModel {
        email: Set(body.email.clone()),
        hashed_password: Set(security::hash_password(&body.password)?),
        role: Set(role.as_str().to_string()),
        status: Set(UserStatus::Active.as_str().to_string()),
        failed_login_count: Set(0),
        locked_until: Set(None),
        department_id: Set(body.department_id),
        is_deleted: Set(false),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let profile = profile::ActiveModel {
        first_name: Set(body.first_name),
        last_name: Set(body.last_name),
        phone: Set(body.phone),
        student_details: Set(body.student_details.map(|v| v.to_string())),
        staff_details: Set(body.staff_details.map(|v| v.to_string())),
        preferences: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let (user, profile) = users.create_user_with_profile(user, profile).await?;

    state
        .activity
        .log_success(
            ActivityAction::UserCreated,
            EntityType::User,
            Some(user.id.to_string()),
            Some(admin.id),
            Some(admin.email.clone()),
            Some(serde_json::json!({ "email": user.email, "role": user.role })),
        )
        .await
        .ok();

    Ok(Json(UserWithProfile {
        user,
        profile: Some(profile),
    }))
}

/// GET /api/users/me
async fn get_current_user(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
) -> Result<Json<UserWithProfile>> {
    let profile = UserRepository::new(state.db.clone())
        .find_profile(user.id)
        .await?;
    Ok(Json(UserWithProfile { user, profile }))
}

/// GET /api/users/{user_id}
async fn get_user(
    Authorized(_admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserWithProfile>> {
    let users = UserRepository::new(state.db.clone());
    let user = users.find_by_id(user_id).await?;
    let profile = users.find_profile(user.id).await?;
    Ok(Json(UserWithProfile { user, profile }))
}

/// PATCH /api/users/{user_id} - user+profile update in one transaction
async fn update_user(
    Authorized(admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserWithProfile>> {
    body.validate()?;

    let mut user_changes = user::ActiveModel {
        ..Default::default()
    };
    if let Some(email) = body.email {
        user_changes.email = Set(email);
    }
    if let Some(role) = body.role {
        let role = UserRole::parse(&role)
            .ok_or_else(|| AppError::BadRequest(format!("unknown role: {}", role)))?;
        user_changes.role = Set(role.as_str().to_string());
    }
    if let Some(status) = body.status {
        user_changes.status = Set(status);
    }
    if let Some(department_id) = body.department_id {
        user_changes.department_id = Set(department_id);
    }

    let mut profile_changes = profile::ActiveModel {
        ..Default::default()
    };
    if let Some(first_name) = body.first_name {
        profile_changes.first_name = Set(first_name);
    }
    if let Some(last_name) = body.last_name {
        profile_changes.last_name = Set(last_name);
    }
    if let Some(phone) = body.phone {
        profile_changes.phone = Set(Some(phone));
    }
    if let Some(details) = body.student_details {
        profile_changes.student_details = Set(Some(details.to_string()));
    }
    if let Some(details) = body.staff_details {
        profile_changes.staff_details = Set(Some(details.to_string()));
    }
    if let Some(preferences) = body.preferences {
        profile_changes.preferences = Set(Some(preferences.to_string()));
    }

    let (user, profile) = UserRepository::new(state.db.clone())
        .update_user_with_profile(user_id, user_changes, profile_changes)
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::UserUpdated,
            EntityType::User,
            Some(user.id.to_string()),
            Some(admin.id),
            Some(admin.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(UserWithProfile {
        user,
        profile: Some(profile),
    }))
}

/// DELETE /api/users/{user_id} - soft delete, revokes outstanding tokens
async fn delete_user(
    Authorized(admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    if user_id == admin.id {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    UserRepository::new(state.db.clone())
        .soft_delete(user_id, Some(admin.id))
        .await?;
    TokenRepository::new(state.db.clone())
        .blacklist_all_for_user(user_id)
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::UserDeleted,
            EntityType::User,
            Some(user_id.to_string()),
            Some(admin.id),
            Some(admin.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(serde_json::json!({ "detail": "User deleted" })))
}
