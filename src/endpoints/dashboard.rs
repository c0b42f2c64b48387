//! Role-scoped dashboards and analytics.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::application::error::Result;
use crate::application::state::AppState;
use crate::middleware::{AdminOnly, Authenticated, Authorized, StaffOnly};
use crate::services::dashboard::{
    self, CategoryUsage, DepartmentStats, MonthlyCompletion, SystemStats, UserCaseStats,
};

pub fn dashboard_routes(state: AppState) -> Router {
    Router::new()
        .route("/system", get(system_stats))
        .route("/department/{department_id}", get(department_stats))
        .route("/staff", get(staff_stats))
        .route("/student", get(student_stats))
        .route("/analytics/case-completion", get(case_completion))
        .route("/analytics/document-usage", get(document_usage))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CompletionParams {
    pub department_id: Option<i64>,
}

/// GET /api/dashboard/system - global counters (admin)
async fn system_stats(
    Authorized(_admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
) -> Result<Json<SystemStats>> {
    Ok(Json(dashboard::get_system_stats(&state.db).await?))
}

/// GET /api/dashboard/department/{department_id} (staff)
async fn department_stats(
    Authorized(_staff, _): Authorized<StaffOnly>,
    State(state): State<AppState>,
    Path(department_id): Path<i64>,
) -> Result<Json<DepartmentStats>> {
    Ok(Json(
        dashboard::get_department_stats(&state.db, department_id).await?,
    ))
}

/// GET /api/dashboard/staff - own review load
async fn staff_stats(
    Authorized(staff, _): Authorized<StaffOnly>,
    State(state): State<AppState>,
) -> Result<Json<UserCaseStats>> {
    Ok(Json(dashboard::get_staff_stats(&state.db, staff.id).await?))
}

/// GET /api/dashboard/student - own case progress
async fn student_stats(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
) -> Result<Json<UserCaseStats>> {
    Ok(Json(dashboard::get_student_stats(&state.db, user.id).await?))
}

/// GET /api/dashboard/analytics/case-completion?department_id= (staff)
async fn case_completion(
    Authorized(_staff, _): Authorized<StaffOnly>,
    State(state): State<AppState>,
    Query(params): Query<CompletionParams>,
) -> Result<Json<Vec<MonthlyCompletion>>> {
    Ok(Json(
        dashboard::get_case_completion_stats(&state.db, params.department_id).await?,
    ))
}

/// GET /api/dashboard/analytics/document-usage (staff)
async fn document_usage(
    Authorized(_staff, _): Authorized<StaffOnly>,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryUsage>>> {
    Ok(Json(dashboard::get_document_usage_stats(&state.db).await?))
}
