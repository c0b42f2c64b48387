use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::error::Result;
use crate::db::DbConn;
use crate::models::notification::NotificationType;
use crate::repositories::NotificationRepository;

/// Notification sink. Case-workflow side effects go through here so the
/// primary write never fails on a notification problem.
#[derive(Clone, Default)]
pub struct NotifyService {
    db: Arc<RwLock<Option<DbConn>>>,
}

impl NotifyService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_db(&self, db: DbConn) {
        *self.db.write().await = Some(db);
    }

    pub async fn is_ready(&self) -> bool {
        self.db.read().await.is_some()
    }

    pub async fn notify(
        &self,
        recipient_id: i64,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<()> {
        let db_guard = self.db.read().await;
        let db = match db_guard.as_ref() {
            Some(db) => db,
            None => {
                tracing::warn!("Notify service: database not initialized, skipping notification");
                return Ok(());
            }
        };

        NotificationRepository::new(db.clone())
            .create(recipient_id, notification_type, title.into(), message.into())
            .await?;
        Ok(())
    }

    /// Fire-and-forget variant; failures are logged, never propagated.
    pub async fn notify_best_effort(
        &self,
        recipient_id: i64,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        if let Err(e) = self
            .notify(recipient_id, notification_type, title, message)
            .await
        {
            tracing::warn!("Failed to create notification: {}", e);
        }
    }
}
