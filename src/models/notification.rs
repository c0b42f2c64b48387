use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipient-scoped in-app notification.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub recipient_id: i64,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    #[schema(value_type = String)]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id"
    )]
    Recipient,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Notification categories surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    CaseSubmitted,
    CaseAssigned,
    CaseStatusChanged,
    CaseEvaluated,
    CaseComment,
    System,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::CaseSubmitted => "case_submitted",
            NotificationType::CaseAssigned => "case_assigned",
            NotificationType::CaseStatusChanged => "case_status_changed",
            NotificationType::CaseEvaluated => "case_evaluated",
            NotificationType::CaseComment => "case_comment",
            NotificationType::System => "system",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
