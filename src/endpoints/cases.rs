//! Case CRUD and the review workflow surface.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{sea_query::Query as SeaQuery, ColumnTrait, Condition, Set};
use serde::Deserialize;
use validator::Validate;

use crate::application::error::{AppError, Result};
use crate::application::state::AppState;
use crate::middleware::{Authenticated, Authorized, StaffOnly};
use crate::models::activity_log::{ActivityAction, EntityType};
use crate::models::case_record::CaseStatus;
use crate::models::notification::NotificationType;
use crate::models::prelude::*;
use crate::models::user::UserRole;
use crate::repositories::{CaseRepository, Page, UserRepository};

pub fn cases_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_cases).post(create_case))
        .route("/search", get(search_cases))
        .route(
            "/{case_id}",
            get(get_case).patch(update_case).delete(delete_case),
        )
        .route("/{case_id}/submit", post(submit_case))
        .route("/{case_id}/assign", post(assign_case))
        .route("/{case_id}/status", post(change_status))
        .route("/{case_id}/evaluate", post(evaluate_case))
        .route("/{case_id}/workflow", get(get_workflow))
        .route("/{case_id}/comments", get(list_comments).post(add_comment))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<String>,
    pub student_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCaseRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub student_id: Option<i64>,
    pub patient_info: Option<serde_json::Value>,
    pub medication_history: Option<serde_json::Value>,
    pub lab_values: Option<serde_json::Value>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCaseRequest {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub patient_info: Option<serde_json::Value>,
    pub medication_history: Option<serde_json::Value>,
    pub lab_values: Option<serde_json::Value>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub staff_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EvaluateRequest {
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1))]
    pub body: String,
}

/// Visibility scope: admins see everything, teachers see assigned and
/// same-department cases, students see their own.
async fn can_access(state: &AppState, user: &user::Model, case: &case_record::Model) -> Result<bool> {
    match user.role() {
        Some(UserRole::Admin) => Ok(true),
        Some(UserRole::Student) => Ok(case.student_id == user.id),
        Some(UserRole::Teacher) => {
            if case.assigned_staff_id == Some(user.id) {
                return Ok(true);
            }
            let Some(my_department) = user.department_id else {
                return Ok(false);
            };
            let student = UserRepository::new(state.db.clone())
                .try_find_by_id(case.student_id)
                .await?;
            Ok(student.and_then(|s| s.department_id) == Some(my_department))
        }
        None => Ok(false),
    }
}

async fn fetch_accessible_case(
    state: &AppState,
    user: &user::Model,
    case_id: i64,
) -> Result<case_record::Model> {
    let case = CaseRepository::new(state.db.clone()).find_by_id(case_id).await?;
    if !can_access(state, user, &case).await? {
        return Err(AppError::Forbidden(
            "You do not have access to this case".to_string(),
        ));
    }
    Ok(case)
}

fn role_scope(user: &user::Model) -> Condition {
    match user.role() {
        Some(UserRole::Admin) => Condition::all(),
        Some(UserRole::Teacher) => {
            let mut scope = Condition::any().add(case_record::Column::AssignedStaffId.eq(user.id));
            if let Some(department_id) = user.department_id {
                let students = SeaQuery::select()
                    .column(user::Column::Id)
                    .from(User)
                    .and_where(user::Column::DepartmentId.eq(department_id))
                    .to_owned();
                scope = scope.add(case_record::Column::StudentId.in_subquery(students));
            }
            Condition::all().add(scope)
        }
        _ => Condition::all().add(case_record::Column::StudentId.eq(user.id)),
    }
}

/// GET /api/cases - role-scoped listing
async fn list_cases(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<case_record::Model>>> {
    let mut cond = role_scope(&user);
    if let Some(status) = &params.status {
        cond = cond.add(case_record::Column::Status.eq(status.clone()));
    }
    if let Some(student_id) = params.student_id {
        cond = cond.add(case_record::Column::StudentId.eq(student_id));
    }

    let page = CaseRepository::new(state.db.clone())
        .paginate(cond, params.page.unwrap_or(1), params.per_page.unwrap_or(20))
        .await?;
    Ok(Json(page))
}

/// GET /api/cases/search?q=
async fn search_cases(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<case_record::Model>>> {
    let results = CaseRepository::new(state.db.clone()).search(&params.q).await?;

    let mut visible = Vec::with_capacity(results.len());
    for case in results {
        if can_access(&state, &user, &case).await? {
            visible.push(case);
        }
    }
    Ok(Json(visible))
}

/// POST /api/cases - new draft
async fn create_case(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Json(body): Json<CreateCaseRequest>,
) -> Result<Json<case_record::Model>> {
    body.validate()?;

    let student_id = match user.role() {
        Some(UserRole::Student) => user.id,
        Some(_) => body.student_id.ok_or_else(|| {
            AppError::BadRequest("student_id is required for staff-created cases".to_string())
        })?,
        None => return Err(AppError::Forbidden("Unknown role".to_string())),
    };

    let cases = CaseRepository::new(state.db.clone());
    let case_number = cases.next_case_number().await?;
    let now = Utc::now();
    let case = cases
        .create(case_record::ActiveModel {
            case_number: Set(case_number),
            student_id: Set(student_id),
            assigned_staff_id: Set(None),
            title: Set(body.title),
            patient_info: Set(body.patient_info.map(|v| v.to_string())),
            medication_history: Set(body.medication_history.map(|v| v.to_string())),
            lab_values: Set(body.lab_values.map(|v| v.to_string())),
            assessment: Set(body.assessment),
            plan: Set(body.plan),
            status: Set(CaseStatus::Draft.as_str().to_string()),
            evaluation_score: Set(None),
            evaluation_feedback: Set(None),
            is_deleted: Set(false),
            deleted_at: Set(None),
            deleted_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::CaseCreated,
            EntityType::Case,
            Some(case.id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            Some(serde_json::json!({ "case_number": case.case_number })),
        )
        .await
        .ok();

    Ok(Json(case))
}

/// GET /api/cases/{case_id}
async fn get_case(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<case_record::Model>> {
    let case = fetch_accessible_case(&state, &user, case_id).await?;
    Ok(Json(case))
}

/// PATCH /api/cases/{case_id} - content edits on drafts and revision rounds
async fn update_case(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
    Json(body): Json<UpdateCaseRequest>,
) -> Result<Json<case_record::Model>> {
    body.validate()?;

    let case = fetch_accessible_case(&state, &user, case_id).await?;

    if user.role() == Some(UserRole::Student) {
        let editable = matches!(
            case.status(),
            Some(CaseStatus::Draft) | Some(CaseStatus::RevisionsNeeded)
        );
        if !editable {
            return Err(AppError::BadRequest(
                "Case can only be edited while in draft or revisions_needed".to_string(),
            ));
        }
    }

    let mut active: case_record::ActiveModel = case.into();
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(patient_info) = body.patient_info {
        active.patient_info = Set(Some(patient_info.to_string()));
    }
    if let Some(history) = body.medication_history {
        active.medication_history = Set(Some(history.to_string()));
    }
    if let Some(lab_values) = body.lab_values {
        active.lab_values = Set(Some(lab_values.to_string()));
    }
    if let Some(assessment) = body.assessment {
        active.assessment = Set(Some(assessment));
    }
    if let Some(plan) = body.plan {
        active.plan = Set(Some(plan));
    }
    active.updated_at = Set(Utc::now());

    let case = CaseRepository::new(state.db.clone())
        .update(active)
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::CaseUpdated,
            EntityType::Case,
            Some(case.id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(case))
}

/// DELETE /api/cases/{case_id} - soft delete (admins, or students on drafts)
async fn delete_case(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let case = fetch_accessible_case(&state, &user, case_id).await?;

    match user.role() {
        Some(UserRole::Admin) => {}
        Some(UserRole::Student) if case.status() == Some(CaseStatus::Draft) => {}
        _ => {
            return Err(AppError::Forbidden(
                "Only admins or draft owners can delete a case".to_string(),
            ))
        }
    }

    CaseRepository::new(state.db.clone())
        .soft_delete(case_id, Some(user.id))
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::CaseDeleted,
            EntityType::Case,
            Some(case_id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(serde_json::json!({ "detail": "Case deleted" })))
}

/// POST /api/cases/{case_id}/submit - student hands the case in
async fn submit_case(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<case_record::Model>> {
    let case = fetch_accessible_case(&state, &user, case_id).await?;
    if user.role() == Some(UserRole::Student) && case.student_id != user.id {
        return Err(AppError::Forbidden(
            "Only the case owner can submit it".to_string(),
        ));
    }

    let (case, _) = CaseRepository::new(state.db.clone())
        .update_status(case_id, CaseStatus::Submitted, user.id, None)
        .await?;

    if let Some(staff_id) = case.assigned_staff_id {
        state
            .notify
            .notify_best_effort(
                staff_id,
                NotificationType::CaseSubmitted,
                "Case submitted",
                format!("Case {} has been submitted for review", case.case_number),
            )
            .await;
    }

    state
        .activity
        .log_success(
            ActivityAction::CaseSubmitted,
            EntityType::Case,
            Some(case.id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(case))
}

/// POST /api/cases/{case_id}/assign - staff routing
async fn assign_case(
    Authorized(staff, _): Authorized<StaffOnly>,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
    Json(body): Json<AssignRequest>,
) -> Result<Json<case_record::Model>> {
    let assignee = UserRepository::new(state.db.clone())
        .find_by_id(body.staff_id)
        .await?;
    if !assignee.role().map(|r| r.is_staff()).unwrap_or(false) {
        return Err(AppError::BadRequest(
            "Cases can only be assigned to staff".to_string(),
        ));
    }

    let case = CaseRepository::new(state.db.clone())
        .assign_to_staff(case_id, assignee.id)
        .await?;

    state
        .notify
        .notify_best_effort(
            assignee.id,
            NotificationType::CaseAssigned,
            "Case assigned",
            format!("Case {} has been assigned to you", case.case_number),
        )
        .await;

    state
        .activity
        .log_success(
            ActivityAction::CaseAssigned,
            EntityType::Case,
            Some(case.id.to_string()),
            Some(staff.id),
            Some(staff.email.clone()),
            Some(serde_json::json!({ "assigned_to": assignee.id })),
        )
        .await
        .ok();

    Ok(Json(case))
}

/// POST /api/cases/{case_id}/status - staff-driven transition
async fn change_status(
    Authorized(staff, _): Authorized<StaffOnly>,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<case_record::Model>> {
    let next = CaseStatus::parse(&body.status)
        .ok_or_else(|| AppError::BadRequest(format!("unknown status: {}", body.status)))?;

    let (case, _) = CaseRepository::new(state.db.clone())
        .update_status(case_id, next, staff.id, body.note.clone())
        .await?;

    state
        .notify
        .notify_best_effort(
            case.student_id,
            NotificationType::CaseStatusChanged,
            "Case status changed",
            format!("Case {} is now {}", case.case_number, case.status),
        )
        .await;

    state
        .activity
        .log_success(
            ActivityAction::CaseStatusChanged,
            EntityType::Case,
            Some(case.id.to_string()),
            Some(staff.id),
            Some(staff.email.clone()),
            Some(serde_json::json!({ "status": case.status, "note": body.note })),
        )
        .await
        .ok();

    Ok(Json(case))
}

/// POST /api/cases/{case_id}/evaluate - score and close out a review
async fn evaluate_case(
    Authorized(staff, _): Authorized<StaffOnly>,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
    Json(body): Json<EvaluateRequest>,
) -> Result<Json<case_record::Model>> {
    body.validate()?;

    let (case, _) = CaseRepository::new(state.db.clone())
        .evaluate(case_id, body.score, body.feedback, staff.id)
        .await?;

    state
        .notify
        .notify_best_effort(
            case.student_id,
            NotificationType::CaseEvaluated,
            "Case evaluated",
            format!("Case {} has been evaluated", case.case_number),
        )
        .await;

    state
        .activity
        .log_success(
            ActivityAction::CaseEvaluated,
            EntityType::Case,
            Some(case.id.to_string()),
            Some(staff.id),
            Some(staff.email.clone()),
            Some(serde_json::json!({ "score": body.score })),
        )
        .await
        .ok();

    Ok(Json(case))
}

/// GET /api/cases/{case_id}/workflow - transition history
async fn get_workflow(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<Vec<workflow_event::Model>>> {
    fetch_accessible_case(&state, &user, case_id).await?;
    let events = CaseRepository::new(state.db.clone()).workflow(case_id).await?;
    Ok(Json(events))
}

/// GET /api/cases/{case_id}/comments
async fn list_comments(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
) -> Result<Json<Vec<case_comment::Model>>> {
    fetch_accessible_case(&state, &user, case_id).await?;
    let comments = CaseRepository::new(state.db.clone()).comments(case_id).await?;
    Ok(Json(comments))
}

/// POST /api/cases/{case_id}/comments
async fn add_comment(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(case_id): Path<i64>,
    Json(body): Json<CommentRequest>,
) -> Result<Json<case_comment::Model>> {
    body.validate()?;

    let case = fetch_accessible_case(&state, &user, case_id).await?;
    let comment = CaseRepository::new(state.db.clone())
        .add_comment(case_id, user.id, body.body)
        .await?;

    // Notify the counterparty: student comments reach the reviewer,
    // staff comments reach the student.
    let recipient = if user.id == case.student_id {
        case.assigned_staff_id
    } else {
        Some(case.student_id)
    };
    if let Some(recipient_id) = recipient {
        state
            .notify
            .notify_best_effort(
                recipient_id,
                NotificationType::CaseComment,
                "New comment",
                format!("New comment on case {}", case.case_number),
            )
            .await;
    }

    state
        .activity
        .log_success(
            ActivityAction::CaseCommentAdded,
            EntityType::Case,
            Some(case.id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(comment))
}
