use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::error::Result;
use crate::db::DbConn;
use crate::models::activity_log::{self, ActivityAction, EntityType};

/// Activity service for recording the audit trail
#[derive(Clone, Default)]
pub struct ActivityService {
    db: Arc<RwLock<Option<DbConn>>>,
}

impl ActivityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_db(&self, db: DbConn) {
        *self.db.write().await = Some(db);
    }

    pub async fn is_ready(&self) -> bool {
        self.db.read().await.is_some()
    }

    /// Record an activity entry
    #[allow(clippy::too_many_arguments)]
    pub async fn log(
        &self,
        action: ActivityAction,
        entity_type: EntityType,
        entity_id: Option<String>,
        user_id: Option<i64>,
        user_email: Option<String>,
        details: Option<serde_json::Value>,
        ip_address: Option<String>,
        user_agent: Option<String>,
        success: bool,
        error_message: Option<String>,
    ) -> Result<()> {
        let db_guard = self.db.read().await;
        let db = match db_guard.as_ref() {
            Some(db) => db,
            None => {
                tracing::warn!("Activity service: database not initialized, skipping log");
                return Ok(());
            }
        };

        let now = chrono::Utc::now();
        let details_str = details.map(|d| d.to_string());

        let log_entry = activity_log::ActiveModel {
            timestamp: Set(now),
            user_id: Set(user_id),
            user_email: Set(user_email),
            action: Set(action.to_string()),
            entity_type: Set(entity_type.to_string()),
            entity_id: Set(entity_id),
            details: Set(details_str),
            ip_address: Set(ip_address),
            user_agent: Set(user_agent),
            success: Set(success),
            error_message: Set(error_message),
            ..Default::default()
        };

        log_entry
            .insert(db)
            .await
            .map_err(|e| crate::application::error::DatabaseError::classify("activity_log", e))?;
        Ok(())
    }

    /// Record a successful action
    #[allow(clippy::too_many_arguments)]
    pub async fn log_success(
        &self,
        action: ActivityAction,
        entity_type: EntityType,
        entity_id: Option<String>,
        user_id: Option<i64>,
        user_email: Option<String>,
        details: Option<serde_json::Value>,
    ) -> Result<()> {
        self.log(
            action,
            entity_type,
            entity_id,
            user_id,
            user_email,
            details,
            None,
            None,
            true,
            None,
        )
        .await
    }

    /// Record a failed action
    #[allow(clippy::too_many_arguments)]
    pub async fn log_failure(
        &self,
        action: ActivityAction,
        entity_type: EntityType,
        entity_id: Option<String>,
        user_id: Option<i64>,
        user_email: Option<String>,
        error: &str,
    ) -> Result<()> {
        self.log(
            action,
            entity_type,
            entity_id,
            user_id,
            user_email,
            None,
            None,
            None,
            false,
            Some(error.to_string()),
        )
        .await
    }
}

/// Query parameters for fetching the activity log
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ActivityLogQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub success: Option<bool>,
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    pub search: Option<String>,
}

/// Paginated activity log response
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ActivityLogResponse {
    pub logs: Vec<activity_log::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// Get activity logs with filtering and pagination
pub async fn get_activity_logs(db: &DbConn, query: ActivityLogQuery) -> Result<ActivityLogResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).min(100);
    let offset = (page - 1) * per_page;

    let mut select = activity_log::Entity::find();

    if let Some(user_id) = query.user_id {
        select = select.filter(activity_log::Column::UserId.eq(user_id));
    }

    if let Some(action) = &query.action {
        select = select.filter(activity_log::Column::Action.eq(action.clone()));
    }

    if let Some(entity_type) = &query.entity_type {
        select = select.filter(activity_log::Column::EntityType.eq(entity_type.clone()));
    }

    if let Some(success) = query.success {
        select = select.filter(activity_log::Column::Success.eq(success));
    }

    if let Some(from) = query.from {
        select = select.filter(activity_log::Column::Timestamp.gte(from));
    }

    if let Some(to) = query.to {
        select = select.filter(activity_log::Column::Timestamp.lte(to));
    }

    if let Some(search) = &query.search {
        let search_pattern = format!("%{}%", search);
        select = select.filter(
            activity_log::Column::UserEmail
                .like(&search_pattern)
                .or(activity_log::Column::Action.like(&search_pattern))
                .or(activity_log::Column::EntityId.like(&search_pattern))
                .or(activity_log::Column::Details.like(&search_pattern)),
        );
    }

    let total = select
        .clone()
        .count(db)
        .await
        .map_err(|e| crate::application::error::DatabaseError::classify("activity_log", e))?;

    let logs = select
        .order_by_desc(activity_log::Column::Timestamp)
        .offset(offset)
        .limit(per_page)
        .all(db)
        .await
        .map_err(|e| crate::application::error::DatabaseError::classify("activity_log", e))?;

    let total_pages = (total as f64 / per_page as f64).ceil() as u64;

    Ok(ActivityLogResponse {
        logs,
        total,
        page,
        per_page,
        total_pages,
    })
}

/// Clear old activity logs (retention policy)
pub async fn clear_old_logs(db: &DbConn, days: i64) -> Result<u64> {
    let cutoff = chrono::Utc::now() - chrono::Duration::days(days);

    let result = activity_log::Entity::delete_many()
        .filter(activity_log::Column::Timestamp.lt(cutoff))
        .exec(db)
        .await
        .map_err(|e| crate::application::error::DatabaseError::classify("activity_log", e))?;

    Ok(result.rows_affected)
}
