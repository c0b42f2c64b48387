//! Case persistence and the status-transition workflow.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use crate::application::error::{AppError, DatabaseError};
use crate::models::case_record::CaseStatus;
use crate::models::prelude::*;
use crate::repositories::base::{Page, Repository, SoftDelete};

/// `CASE-YYYYMM-XXXX`. Exact matches skip the LIKE search path.
pub fn is_case_number(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("CASE-") else {
        return false;
    };
    let mut parts = rest.splitn(2, '-');
    let (Some(period), Some(serial)) = (parts.next(), parts.next()) else {
        return false;
    };
    period.len() == 6
        && serial.len() == 4
        && period.chars().all(|c| c.is_ascii_digit())
        && serial.chars().all(|c| c.is_ascii_digit())
}

#[derive(Clone)]
pub struct CaseRepository {
    base: Repository<Case>,
}

impl CaseRepository {
    pub fn new(db: DbConn) -> Self {
        CaseRepository {
            base: Repository::new(db, "case"),
        }
    }

    fn db(&self) -> &DbConn {
        self.base.db()
    }

    pub async fn create(&self, model: case_record::ActiveModel) -> Result<case_record::Model, DatabaseError> {
        self.base.create(model).await
    }

    pub async fn update(
        &self,
        model: case_record::ActiveModel,
    ) -> Result<case_record::Model, DatabaseError> {
        model
            .update(self.db())
            .await
            .map_err(|e| DatabaseError::classify("case", e))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<case_record::Model, DatabaseError> {
        self.base
            .try_find_one(Case::not_deleted().add(case_record::Column::Id.eq(id)))
            .await?
            .ok_or_else(|| DatabaseError::not_found("case", id))
    }

    pub async fn find_by_number(
        &self,
        case_number: &str,
    ) -> Result<Option<case_record::Model>, DatabaseError> {
        self.base
            .try_find_one(
                Case::not_deleted().add(case_record::Column::CaseNumber.eq(case_number)),
            )
            .await
    }

    pub async fn find_by_status(
        &self,
        status: CaseStatus,
    ) -> Result<Vec<case_record::Model>, DatabaseError> {
        self.base
            .find_many(Case::not_deleted().add(case_record::Column::Status.eq(status.as_str())))
            .await
    }

    pub async fn find_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<case_record::Model>, DatabaseError> {
        self.base
            .find_many(Case::not_deleted().add(case_record::Column::StudentId.eq(student_id)))
            .await
    }

    pub async fn find_by_staff(
        &self,
        staff_id: i64,
    ) -> Result<Vec<case_record::Model>, DatabaseError> {
        self.base
            .find_many(
                Case::not_deleted().add(case_record::Column::AssignedStaffId.eq(staff_id)),
            )
            .await
    }

    /// Cases authored by students belonging to a department.
    pub async fn find_by_department(
        &self,
        department_id: i64,
    ) -> Result<Vec<case_record::Model>, DatabaseError> {
        Case::find()
            .join(JoinType::InnerJoin, case_record::Relation::Student.def())
            .filter(user::Column::DepartmentId.eq(department_id))
            .filter(Case::not_deleted())
            .all(self.db())
            .await
            .map_err(|e| DatabaseError::classify("case", e))
    }

    pub async fn paginate(
        &self,
        cond: Condition,
        page: u64,
        per_page: u64,
    ) -> Result<Page<case_record::Model>, DatabaseError> {
        self.base
            .paginate(Case::not_deleted().add(cond), page, per_page)
            .await
    }

    pub async fn count(&self, cond: Condition) -> Result<u64, DatabaseError> {
        self.base.count(Case::not_deleted().add(cond)).await
    }

    pub async fn assign_to_staff(
        &self,
        case_id: i64,
        staff_id: i64,
    ) -> Result<case_record::Model, DatabaseError> {
        let case = self.find_by_id(case_id).await?;
        let mut active: case_record::ActiveModel = case.into();
        active.assigned_staff_id = Set(Some(staff_id));
        active.updated_at = Set(Utc::now());
        active
            .update(self.db())
            .await
            .map_err(|e| DatabaseError::classify("case", e))
    }

    /// Validate and apply a status transition, appending exactly one
    /// workflow event in the same transaction.
    pub async fn update_status(
        &self,
        case_id: i64,
        next: CaseStatus,
        changed_by: i64,
        note: Option<String>,
    ) -> Result<(case_record::Model, workflow_event::Model), AppError> {
        let case = self.find_by_id(case_id).await?;
        let current = case
            .status()
            .ok_or_else(|| AppError::Internal(format!("unknown case status: {}", case.status)))?;

        if !current.can_transition_to(next) {
            return Err(AppError::BadRequest(format!(
                "invalid status transition: {} -> {}",
                current, next
            )));
        }

        let txn = self
            .db()
            .begin()
            .await
            .map_err(|e| DatabaseError::in_transaction("case", e))?;

        let now = Utc::now();
        let mut active: case_record::ActiveModel = case.into();
        active.status = Set(next.as_str().to_string());
        active.updated_at = Set(now);
        let case = active
            .update(&txn)
            .await
            .map_err(|e| DatabaseError::in_transaction("case", e))?;

        let event = workflow_event::ActiveModel {
            case_id: Set(case.id),
            status: Set(next.as_str().to_string()),
            changed_by: Set(changed_by),
            note: Set(note),
            changed_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| DatabaseError::in_transaction("workflow_event", e))?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::in_transaction("case", e))?;

        Ok((case, event))
    }

    /// Record a score and feedback for a case under review and close it
    /// out as completed.
    pub async fn evaluate(
        &self,
        case_id: i64,
        score: i32,
        feedback: Option<String>,
        changed_by: i64,
    ) -> Result<(case_record::Model, workflow_event::Model), AppError> {
        let case = self.find_by_id(case_id).await?;
        if case.status() != Some(CaseStatus::InReview) {
            return Err(AppError::BadRequest(format!(
                "case {} is not under review",
                case.case_number
            )));
        }

        let txn = self
            .db()
            .begin()
            .await
            .map_err(|e| DatabaseError::in_transaction("case", e))?;

        let now = Utc::now();
        let mut active: case_record::ActiveModel = case.into();
        active.status = Set(CaseStatus::Completed.as_str().to_string());
        active.evaluation_score = Set(Some(score));
        active.evaluation_feedback = Set(feedback.clone());
        active.updated_at = Set(now);
        let case = active
            .update(&txn)
            .await
            .map_err(|e| DatabaseError::in_transaction("case", e))?;

        let event = workflow_event::ActiveModel {
            case_id: Set(case.id),
            status: Set(CaseStatus::Completed.as_str().to_string()),
            changed_by: Set(changed_by),
            note: Set(feedback),
            changed_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| DatabaseError::in_transaction("workflow_event", e))?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::in_transaction("case", e))?;

        Ok((case, event))
    }

    /// Exact case-number lookup when the query is shaped like one,
    /// otherwise a LIKE union over title, assessment and plan.
    pub async fn search(&self, query: &str) -> Result<Vec<case_record::Model>, DatabaseError> {
        if is_case_number(query) {
            return Ok(self.find_by_number(query).await?.into_iter().collect());
        }

        let pattern = format!("%{}%", query);
        self.base
            .find_many(
                Case::not_deleted().add(
                    Condition::any()
                        .add(case_record::Column::Title.like(&pattern))
                        .add(case_record::Column::Assessment.like(&pattern))
                        .add(case_record::Column::Plan.like(&pattern)),
                ),
            )
            .await
    }

    /// Next `CASE-YYYYMM-XXXX` serial for the current month.
    pub async fn next_case_number(&self) -> Result<String, DatabaseError> {
        let prefix = format!("CASE-{}-", Utc::now().format("%Y%m"));
        let taken = self
            .base
            .count(
                Condition::all()
                    .add(case_record::Column::CaseNumber.starts_with(&prefix)),
            )
            .await?;
        Ok(format!("{}{:04}", prefix, taken + 1))
    }

    /// Full transition history for a case, oldest first.
    pub async fn workflow(&self, case_id: i64) -> Result<Vec<workflow_event::Model>, DatabaseError> {
        WorkflowEvent::find()
            .filter(workflow_event::Column::CaseId.eq(case_id))
            .order_by_asc(workflow_event::Column::ChangedAt)
            .order_by_asc(workflow_event::Column::Id)
            .all(self.db())
            .await
            .map_err(|e| DatabaseError::classify("workflow_event", e))
    }

    pub async fn comments(&self, case_id: i64) -> Result<Vec<case_comment::Model>, DatabaseError> {
        CaseComment::find()
            .filter(case_comment::Column::CaseId.eq(case_id))
            .order_by_asc(case_comment::Column::CreatedAt)
            .all(self.db())
            .await
            .map_err(|e| DatabaseError::classify("case_comment", e))
    }

    pub async fn add_comment(
        &self,
        case_id: i64,
        author_id: i64,
        body: String,
    ) -> Result<case_comment::Model, DatabaseError> {
        case_comment::ActiveModel {
            case_id: Set(case_id),
            author_id: Set(author_id),
            body: Set(body),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .map_err(|e| DatabaseError::classify("case_comment", e))
    }

    pub async fn soft_delete(&self, case_id: i64, deleted_by: Option<i64>) -> Result<(), DatabaseError> {
        self.base.delete_by_id(case_id, deleted_by).await
    }
}
