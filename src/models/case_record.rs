use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student-authored clinical write-up routed through a review workflow.
///
/// Clinical sections (`patient_info`, `medication_history`, `lab_values`)
/// are stored as JSON strings; their internal shape is owned by the client.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub case_number: String,
    pub student_id: i64,
    pub assigned_staff_id: Option<i64>,
    pub title: String,
    pub patient_info: Option<String>,
    pub medication_history: Option<String>,
    pub lab_values: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub status: String,
    pub evaluation_score: Option<i32>,
    pub evaluation_feedback: Option<String>,
    pub is_deleted: bool,
    #[schema(value_type = Option<String>)]
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
    #[schema(value_type = String)]
    pub created_at: DateTimeUtc,
    #[schema(value_type = String)]
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::workflow_event::Entity")]
    WorkflowEvents,
    #[sea_orm(has_many = "super::case_comment::Entity")]
    Comments,
}

impl Related<super::workflow_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkflowEvents.def()
    }
}

impl Related<super::case_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Review workflow states for a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Draft,
    Submitted,
    InReview,
    RevisionsNeeded,
    Completed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Draft => "draft",
            CaseStatus::Submitted => "submitted",
            CaseStatus::InReview => "in_review",
            CaseStatus::RevisionsNeeded => "revisions_needed",
            CaseStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(CaseStatus::Draft),
            "submitted" => Some(CaseStatus::Submitted),
            "in_review" => Some(CaseStatus::InReview),
            "revisions_needed" => Some(CaseStatus::RevisionsNeeded),
            "completed" => Some(CaseStatus::Completed),
            _ => None,
        }
    }

    /// Legal forward transitions. Revisions loop back through `submitted`.
    pub fn can_transition_to(&self, next: CaseStatus) -> bool {
        matches!(
            (self, next),
            (CaseStatus::Draft, CaseStatus::Submitted)
                | (CaseStatus::Submitted, CaseStatus::InReview)
                | (CaseStatus::InReview, CaseStatus::RevisionsNeeded)
                | (CaseStatus::InReview, CaseStatus::Completed)
                | (CaseStatus::RevisionsNeeded, CaseStatus::Submitted)
        )
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Model {
    pub fn status(&self) -> Option<CaseStatus> {
        CaseStatus::parse(&self.status)
    }
}
