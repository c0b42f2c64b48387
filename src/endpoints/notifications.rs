//! Per-user notification inbox.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::application::error::Result;
use crate::application::state::AppState;
use crate::middleware::Authenticated;
use crate::models::prelude::*;
use crate::repositories::{NotificationRepository, Page};

pub fn notifications_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{notification_id}/read", post(mark_read))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// GET /api/notifications - own inbox, newest pages first
async fn list_notifications(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<notification::Model>>> {
    let page = NotificationRepository::new(state.db.clone())
        .for_recipient(
            user.id,
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(20),
        )
        .await?;
    Ok(Json(page))
}

/// GET /api/notifications/unread-count
async fn unread_count(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let count = NotificationRepository::new(state.db.clone())
        .unread_count(user.id)
        .await?;
    Ok(Json(serde_json::json!({ "unread": count })))
}

/// POST /api/notifications/{notification_id}/read
async fn mark_read(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> Result<Json<notification::Model>> {
    let notification = NotificationRepository::new(state.db.clone())
        .mark_read(notification_id, user.id)
        .await?;
    Ok(Json(notification))
}

/// POST /api/notifications/read-all
async fn mark_all_read(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    let updated = NotificationRepository::new(state.db.clone())
        .mark_all_read(user.id)
        .await?;
    Ok(Json(serde_json::json!({ "marked_read": updated })))
}
