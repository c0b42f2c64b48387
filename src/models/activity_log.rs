use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[schema(value_type = String)]
    pub timestamp: DateTimeUtc,
    pub user_id: Option<i64>,
    pub user_email: Option<String>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: Option<String>, // JSON string, including before/after diffs
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// Activity action types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActivityAction {
    // Authentication
    Login,
    LoginFailed,
    Logout,
    TokenRefresh,
    AccountLocked,

    // User management
    UserCreated,
    UserUpdated,
    UserDeleted,

    // Case workflow
    CaseCreated,
    CaseUpdated,
    CaseSubmitted,
    CaseAssigned,
    CaseStatusChanged,
    CaseEvaluated,
    CaseDeleted,
    CaseCommentAdded,

    // Documents
    DocumentCreated,
    DocumentUpdated,
    DocumentVersionAdded,
    DocumentAccessed,
    DocumentDeleted,

    // Departments
    DepartmentCreated,
    DepartmentUpdated,
    DepartmentDeleted,

    // QR codes
    QrCodeGenerated,
    QrCodeResolved,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityAction::Login => write!(f, "login"),
            ActivityAction::LoginFailed => write!(f, "login_failed"),
            ActivityAction::Logout => write!(f, "logout"),
            ActivityAction::TokenRefresh => write!(f, "token_refresh"),
            ActivityAction::AccountLocked => write!(f, "account_locked"),
            ActivityAction::UserCreated => write!(f, "user_created"),
            ActivityAction::UserUpdated => write!(f, "user_updated"),
            ActivityAction::UserDeleted => write!(f, "user_deleted"),
            ActivityAction::CaseCreated => write!(f, "case_created"),
            ActivityAction::CaseUpdated => write!(f, "case_updated"),
            ActivityAction::CaseSubmitted => write!(f, "case_submitted"),
            ActivityAction::CaseAssigned => write!(f, "case_assigned"),
            ActivityAction::CaseStatusChanged => write!(f, "case_status_changed"),
            ActivityAction::CaseEvaluated => write!(f, "case_evaluated"),
            ActivityAction::CaseDeleted => write!(f, "case_deleted"),
            ActivityAction::CaseCommentAdded => write!(f, "case_comment_added"),
            ActivityAction::DocumentCreated => write!(f, "document_created"),
            ActivityAction::DocumentUpdated => write!(f, "document_updated"),
            ActivityAction::DocumentVersionAdded => write!(f, "document_version_added"),
            ActivityAction::DocumentAccessed => write!(f, "document_accessed"),
            ActivityAction::DocumentDeleted => write!(f, "document_deleted"),
            ActivityAction::DepartmentCreated => write!(f, "department_created"),
            ActivityAction::DepartmentUpdated => write!(f, "department_updated"),
            ActivityAction::DepartmentDeleted => write!(f, "department_deleted"),
            ActivityAction::QrCodeGenerated => write!(f, "qr_code_generated"),
            ActivityAction::QrCodeResolved => write!(f, "qr_code_resolved"),
        }
    }
}

// Entity types referenced by activity entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityType {
    User,
    Case,
    Document,
    Department,
    Notification,
    Token,
    QrCode,
    System,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::User => write!(f, "user"),
            EntityType::Case => write!(f, "case"),
            EntityType::Document => write!(f, "document"),
            EntityType::Department => write!(f, "department"),
            EntityType::Notification => write!(f, "notification"),
            EntityType::Token => write!(f, "token"),
            EntityType::QrCode => write!(f, "qr_code"),
            EntityType::System => write!(f, "system"),
        }
    }
}
