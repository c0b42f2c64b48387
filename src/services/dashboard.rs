//! Role-scoped dashboard aggregation.
//!
//! All reads here are dashboard-grade: independent counts run concurrently
//! with no cross-count transactional guarantee.

use std::collections::HashMap;

use chrono::{Duration, Months, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use serde::Serialize;

use crate::application::error::{DatabaseError, Result};
use crate::db::DbConn;
use crate::models::case_record::CaseStatus;
use crate::models::prelude::*;
use crate::repositories::SoftDelete;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SystemStats {
    pub total_users: u64,
    pub total_cases: u64,
    pub total_documents: u64,
    pub total_departments: u64,
    pub cases_by_status: Vec<StatusCount>,
    pub active_users_24h: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StaffCaseLoad {
    pub staff_id: i64,
    pub case_count: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DepartmentStats {
    pub department: department::Model,
    pub staff_count: u64,
    pub student_count: u64,
    pub total_cases: u64,
    pub cases_by_status: Vec<StatusCount>,
    pub staff_case_load: Vec<StaffCaseLoad>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UserCaseStats {
    pub total_cases: u64,
    pub cases_by_status: Vec<StatusCount>,
    pub recent_cases: Vec<case_record::Model>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MonthlyCompletion {
    pub month: String,
    pub total: u64,
    pub completed: u64,
    /// Percentage with one decimal, e.g. `"100.0"`.
    pub completion_rate: String,
    pub avg_completion_days: f64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DocumentAccessCount {
    pub document_id: i64,
    pub document_number: String,
    pub title: String,
    pub access_count: u64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CategoryUsage {
    pub category: String,
    pub document_count: u64,
    pub access_count: u64,
    pub top_documents: Vec<DocumentAccessCount>,
}

fn status_distribution(cases: &[case_record::Model]) -> Vec<StatusCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for case in cases {
        *counts.entry(case.status.as_str()).or_insert(0) += 1;
    }
    let mut distribution: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.to_string(),
            count,
        })
        .collect();
    distribution.sort_by(|a, b| a.status.cmp(&b.status));
    distribution
}

async fn count_active<E>(db: &DbConn, cond: Condition, entity: &'static str) -> Result<u64>
where
    E: EntityTrait,
    E::Model: sea_orm::FromQueryResult + Send + Sync,
{
    E::find()
        .filter(cond)
        .count(db)
        .await
        .map_err(|e| DatabaseError::classify(entity, e).into())
}

/// Global counters for the admin dashboard.
pub async fn get_system_stats(db: &DbConn) -> Result<SystemStats> {
    let (total_users, total_cases, total_documents, total_departments) = tokio::try_join!(
        count_active::<User>(db, User::not_deleted(), "user"),
        count_active::<Case>(db, Case::not_deleted(), "case"),
        count_active::<Document>(db, Document::not_deleted(), "document"),
        count_active::<Department>(db, Department::not_deleted(), "department"),
    )?;

    let cases = Case::find()
        .filter(Case::not_deleted())
        .all(db)
        .await
        .map_err(|e| DatabaseError::classify("case", e))?;

    let cutoff = Utc::now() - Duration::hours(24);
    let recent_logs = ActivityLog::find()
        .filter(activity_log::Column::Timestamp.gte(cutoff))
        .all(db)
        .await
        .map_err(|e| DatabaseError::classify("activity_log", e))?;
    let active_users_24h = recent_logs
        .iter()
        .filter_map(|log| log.user_id)
        .collect::<std::collections::HashSet<_>>()
        .len() as u64;

    Ok(SystemStats {
        total_users,
        total_cases,
        total_documents,
        total_departments,
        cases_by_status: status_distribution(&cases),
        active_users_24h,
    })
}

/// Department-scoped counters plus per-staff case-load distribution.
pub async fn get_department_stats(db: &DbConn, department_id: i64) -> Result<DepartmentStats> {
    let department = Department::find()
        .filter(Department::not_deleted().add(department::Column::Id.eq(department_id)))
        .one(db)
        .await
        .map_err(|e| DatabaseError::classify("department", e))?
        .ok_or_else(|| DatabaseError::not_found("department", department_id))?;

    let repo = crate::repositories::DepartmentRepository::new(db.clone());
    let (staff_count, student_count) = tokio::try_join!(
        repo.staff_count(department_id),
        repo.student_count(department_id),
    )?;

    let cases = Case::find()
        .join(JoinType::InnerJoin, case_record::Relation::Student.def())
        .filter(user::Column::DepartmentId.eq(department_id))
        .filter(Case::not_deleted())
        .all(db)
        .await
        .map_err(|e| DatabaseError::classify("case", e))?;

    let mut loads: HashMap<i64, u64> = HashMap::new();
    for case in &cases {
        if let Some(staff_id) = case.assigned_staff_id {
            *loads.entry(staff_id).or_insert(0) += 1;
        }
    }
    let mut staff_case_load: Vec<StaffCaseLoad> = loads
        .into_iter()
        .map(|(staff_id, case_count)| StaffCaseLoad {
            staff_id,
            case_count,
        })
        .collect();
    staff_case_load.sort_by(|a, b| b.case_count.cmp(&a.case_count));

    Ok(DepartmentStats {
        department,
        staff_count,
        student_count,
        total_cases: cases.len() as u64,
        cases_by_status: status_distribution(&cases),
        staff_case_load,
    })
}

async fn user_case_stats(db: &DbConn, cond: Condition) -> Result<UserCaseStats> {
    let cases = Case::find()
        .filter(Case::not_deleted().add(cond))
        .all(db)
        .await
        .map_err(|e| DatabaseError::classify("case", e))?;

    let mut recent = cases.clone();
    recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    recent.truncate(5);

    Ok(UserCaseStats {
        total_cases: cases.len() as u64,
        cases_by_status: status_distribution(&cases),
        recent_cases: recent,
    })
}

/// Case counters for a reviewing staff member.
pub async fn get_staff_stats(db: &DbConn, user_id: i64) -> Result<UserCaseStats> {
    user_case_stats(
        db,
        Condition::all().add(case_record::Column::AssignedStaffId.eq(user_id)),
    )
    .await
}

/// Case counters for a student.
pub async fn get_student_stats(db: &DbConn, user_id: i64) -> Result<UserCaseStats> {
    user_case_stats(
        db,
        Condition::all().add(case_record::Column::StudentId.eq(user_id)),
    )
    .await
}

/// Monthly completion buckets over the last six months. Completion latency
/// is measured from the latest `submitted` event preceding the `completed`
/// event, so revision cycles count from the final resubmission.
pub async fn get_case_completion_stats(
    db: &DbConn,
    department_id: Option<i64>,
) -> Result<Vec<MonthlyCompletion>> {
    let now = Utc::now();
    let cutoff = now.checked_sub_months(Months::new(6)).unwrap_or(now);

    let mut select = Case::find()
        .filter(Case::not_deleted())
        .filter(case_record::Column::CreatedAt.gte(cutoff));
    if let Some(department_id) = department_id {
        select = select
            .join(JoinType::InnerJoin, case_record::Relation::Student.def())
            .filter(user::Column::DepartmentId.eq(department_id));
    }
    let cases = select
        .all(db)
        .await
        .map_err(|e| DatabaseError::classify("case", e))?;

    if cases.is_empty() {
        return Ok(Vec::new());
    }

    let case_ids: Vec<i64> = cases.iter().map(|c| c.id).collect();
    let events = WorkflowEvent::find()
        .filter(workflow_event::Column::CaseId.is_in(case_ids))
        .order_by_asc(workflow_event::Column::ChangedAt)
        .order_by_asc(workflow_event::Column::Id)
        .all(db)
        .await
        .map_err(|e| DatabaseError::classify("workflow_event", e))?;

    let mut events_by_case: HashMap<i64, Vec<&workflow_event::Model>> = HashMap::new();
    for event in &events {
        events_by_case.entry(event.case_id).or_default().push(event);
    }

    struct Bucket {
        total: u64,
        completed: u64,
        latency_days: Vec<f64>,
    }
    let mut buckets: HashMap<String, Bucket> = HashMap::new();

    for case in &cases {
        let month = case.created_at.format("%Y-%m").to_string();
        let bucket = buckets.entry(month).or_insert(Bucket {
            total: 0,
            completed: 0,
            latency_days: Vec::new(),
        });
        bucket.total += 1;

        if case.status() != Some(CaseStatus::Completed) {
            continue;
        }
        bucket.completed += 1;

        if let Some(case_events) = events_by_case.get(&case.id) {
            let completed_at = case_events
                .iter()
                .find(|e| e.status == CaseStatus::Completed.as_str())
                .map(|e| e.changed_at);
            if let Some(completed_at) = completed_at {
                let submitted_at = case_events
                    .iter()
                    .filter(|e| {
                        e.status == CaseStatus::Submitted.as_str() && e.changed_at <= completed_at
                    })
                    .map(|e| e.changed_at)
                    .max();
                if let Some(submitted_at) = submitted_at {
                    let days = (completed_at - submitted_at).num_seconds() as f64 / 86_400.0;
                    bucket.latency_days.push(days.max(0.0));
                }
            }
        }
    }

    let mut stats: Vec<MonthlyCompletion> = buckets
        .into_iter()
        .map(|(month, bucket)| {
            let completion_rate = if bucket.total == 0 {
                "0.0".to_string()
            } else {
                format!(
                    "{:.1}",
                    bucket.completed as f64 * 100.0 / bucket.total as f64
                )
            };
            let avg_completion_days = if bucket.latency_days.is_empty() {
                0.0
            } else {
                bucket.latency_days.iter().sum::<f64>() / bucket.latency_days.len() as f64
            };
            MonthlyCompletion {
                month,
                total: bucket.total,
                completed: bucket.completed,
                completion_rate,
                avg_completion_days,
            }
        })
        .collect();
    stats.sort_by(|a, b| a.month.cmp(&b.month));

    Ok(stats)
}

/// Per-category document counts with access totals and the five
/// most-accessed documents in each category.
pub async fn get_document_usage_stats(db: &DbConn) -> Result<Vec<CategoryUsage>> {
    let documents = Document::find()
        .filter(Document::not_deleted())
        .all(db)
        .await
        .map_err(|e| DatabaseError::classify("document", e))?;

    let access_logs = DocumentAccessLog::find()
        .all(db)
        .await
        .map_err(|e| DatabaseError::classify("document_access_log", e))?;

    let mut access_by_document: HashMap<i64, u64> = HashMap::new();
    for log in &access_logs {
        *access_by_document.entry(log.document_id).or_insert(0) += 1;
    }

    let mut by_category: HashMap<String, Vec<&document::Model>> = HashMap::new();
    for document in &documents {
        by_category
            .entry(document.category.clone())
            .or_default()
            .push(document);
    }

    let mut usage: Vec<CategoryUsage> = by_category
        .into_iter()
        .map(|(category, docs)| {
            let mut counted: Vec<DocumentAccessCount> = docs
                .iter()
                .map(|d| DocumentAccessCount {
                    document_id: d.id,
                    document_number: d.document_number.clone(),
                    title: d.title.clone(),
                    access_count: access_by_document.get(&d.id).copied().unwrap_or(0),
                })
                .collect();
            counted.sort_by(|a, b| b.access_count.cmp(&a.access_count));
            let access_count = counted.iter().map(|d| d.access_count).sum();
            counted.truncate(5);

            CategoryUsage {
                category,
                document_count: docs.len() as u64,
                access_count,
                top_documents: counted,
            }
        })
        .collect();
    usage.sort_by(|a, b| a.category.cmp(&b.category));

    Ok(usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    #[test]
    fn test_stats_types_expose_openapi_schemas() {
        // The embedded entity models must carry schema impls too.
        let _ = DepartmentStats::schema();
        let _ = UserCaseStats::schema();
        let _ = crate::models::department::Model::schema();
        let _ = crate::models::case_record::Model::schema();
    }
}
