//! Activity-log administration.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::application::error::Result;
use crate::application::state::AppState;
use crate::middleware::{AdminOnly, Authorized};
use crate::services::activity::{self, ActivityLogQuery, ActivityLogResponse};

pub fn activity_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_activity))
        .route("/clear", post(clear_activity))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    pub days: i64,
}

/// GET /api/activity - filtered, paginated audit trail (admin)
async fn list_activity(
    Authorized(_admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Query(query): Query<ActivityLogQuery>,
) -> Result<Json<ActivityLogResponse>> {
    Ok(Json(activity::get_activity_logs(&state.db, query).await?))
}

/// POST /api/activity/clear - retention cleanup (admin)
async fn clear_activity(
    Authorized(_admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Json(body): Json<ClearRequest>,
) -> Result<Json<serde_json::Value>> {
    let removed = activity::clear_old_logs(&state.db, body.days).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}
