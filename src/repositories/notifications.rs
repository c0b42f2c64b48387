//! Recipient-scoped notification persistence.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, Set, Value,
};

use crate::application::error::DatabaseError;
use crate::models::notification::NotificationType;
use crate::models::prelude::*;
use crate::repositories::base::{Page, Repository};

#[derive(Clone)]
pub struct NotificationRepository {
    base: Repository<Notification>,
}

impl NotificationRepository {
    pub fn new(db: DbConn) -> Self {
        NotificationRepository {
            base: Repository::new(db, "notification"),
        }
    }

    pub async fn create(
        &self,
        recipient_id: i64,
        notification_type: NotificationType,
        title: String,
        message: String,
    ) -> Result<notification::Model, DatabaseError> {
        self.base
            .create(notification::ActiveModel {
                recipient_id: Set(recipient_id),
                notification_type: Set(notification_type.as_str().to_string()),
                title: Set(title),
                message: Set(message),
                read: Set(false),
                created_at: Set(Utc::now()),
                ..Default::default()
            })
            .await
    }

    pub async fn for_recipient(
        &self,
        recipient_id: i64,
        page: u64,
        per_page: u64,
    ) -> Result<Page<notification::Model>, DatabaseError> {
        self.base
            .paginate(
                Condition::all().add(notification::Column::RecipientId.eq(recipient_id)),
                page,
                per_page,
            )
            .await
    }

    pub async fn unread_count(&self, recipient_id: i64) -> Result<u64, DatabaseError> {
        self.base
            .count(
                Condition::all()
                    .add(notification::Column::RecipientId.eq(recipient_id))
                    .add(notification::Column::Read.eq(false)),
            )
            .await
    }

    /// Mark one notification read; recipient-scoped so users cannot touch
    /// each other's rows.
    pub async fn mark_read(
        &self,
        id: i64,
        recipient_id: i64,
    ) -> Result<notification::Model, DatabaseError> {
        let notification = self
            .base
            .try_find_one(
                Condition::all()
                    .add(notification::Column::Id.eq(id))
                    .add(notification::Column::RecipientId.eq(recipient_id)),
            )
            .await?
            .ok_or_else(|| DatabaseError::not_found("notification", id))?;

        let mut active: notification::ActiveModel = notification.into();
        active.read = Set(true);
        active
            .update(self.base.db())
            .await
            .map_err(|e| DatabaseError::classify("notification", e))
    }

    pub async fn mark_all_read(&self, recipient_id: i64) -> Result<u64, DatabaseError> {
        self.base
            .update_many(
                Condition::all()
                    .add(notification::Column::RecipientId.eq(recipient_id))
                    .add(notification::Column::Read.eq(false)),
                vec![(notification::Column::Read, Value::from(true))],
            )
            .await
    }
}
