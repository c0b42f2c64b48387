//! Dashboard aggregation services.

mod common;
use common::{
    create_test_case, create_test_db, create_test_department, create_test_user,
    create_test_user_in_department,
};

use medcase::models::case_record::CaseStatus;
use medcase::models::user::UserRole;
use medcase::repositories::CaseRepository;
use medcase::services::dashboard;

#[tokio::test]
async fn test_system_stats_on_empty_database() {
    let db = create_test_db().await;
    let stats = dashboard::get_system_stats(&db).await.unwrap();

    assert_eq!(stats.total_users, 0);
    assert_eq!(stats.total_cases, 0);
    assert_eq!(stats.total_documents, 0);
    assert!(stats.cases_by_status.is_empty());
    assert_eq!(stats.active_users_24h, 0);
}

#[tokio::test]
async fn test_system_stats_counts_and_distribution() {
    let db = create_test_db().await;
    let student = create_test_user(&db, "s@example.org", "password123", UserRole::Student).await;
    create_test_user(&db, "t@example.org", "password123", UserRole::Teacher).await;
    create_test_case(&db, "CASE-202608-0001", student.id, CaseStatus::Draft).await;
    create_test_case(&db, "CASE-202608-0002", student.id, CaseStatus::Draft).await;
    create_test_case(&db, "CASE-202608-0003", student.id, CaseStatus::Submitted).await;

    let stats = dashboard::get_system_stats(&db).await.unwrap();
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.total_cases, 3);

    let draft = stats
        .cases_by_status
        .iter()
        .find(|s| s.status == "draft")
        .unwrap();
    assert_eq!(draft.count, 2);
    let submitted = stats
        .cases_by_status
        .iter()
        .find(|s| s.status == "submitted")
        .unwrap();
    assert_eq!(submitted.count, 1);
}

#[tokio::test]
async fn test_soft_deleted_cases_not_counted() {
    let db = create_test_db().await;
    let student = create_test_user(&db, "s@example.org", "password123", UserRole::Student).await;
    let case = create_test_case(&db, "CASE-202608-0001", student.id, CaseStatus::Draft).await;

    CaseRepository::new(db.clone())
        .soft_delete(case.id, None)
        .await
        .unwrap();

    let stats = dashboard::get_system_stats(&db).await.unwrap();
    assert_eq!(stats.total_cases, 0);
}

#[tokio::test]
async fn test_department_stats_unknown_department() {
    let db = create_test_db().await;
    assert!(dashboard::get_department_stats(&db, 404).await.is_err());
}

#[tokio::test]
async fn test_department_stats_scopes_to_members() {
    let db = create_test_db().await;
    let dept = create_test_department(&db, "Pharmacology", "PHARM").await;
    let insider = create_test_user_in_department(
        &db,
        "in@example.org",
        "password123",
        UserRole::Student,
        Some(dept.id),
    )
    .await;
    let teacher = create_test_user_in_department(
        &db,
        "t@example.org",
        "password123",
        UserRole::Teacher,
        Some(dept.id),
    )
    .await;
    let outsider = create_test_user(&db, "out@example.org", "password123", UserRole::Student).await;

    create_test_case(&db, "CASE-202608-0001", insider.id, CaseStatus::Submitted).await;
    create_test_case(&db, "CASE-202608-0002", outsider.id, CaseStatus::Submitted).await;

    let stats = dashboard::get_department_stats(&db, dept.id).await.unwrap();
    assert_eq!(stats.student_count, 1);
    assert_eq!(stats.staff_count, 1);
    assert_eq!(stats.total_cases, 1);
    assert!(stats.staff_case_load.is_empty());

    let case = CaseRepository::new(db.clone())
        .find_by_number("CASE-202608-0001")
        .await
        .unwrap()
        .unwrap();
    CaseRepository::new(db.clone())
        .assign_to_staff(case.id, teacher.id)
        .await
        .unwrap();

    let stats = dashboard::get_department_stats(&db, dept.id).await.unwrap();
    assert_eq!(stats.staff_case_load.len(), 1);
    assert_eq!(stats.staff_case_load[0].staff_id, teacher.id);
    assert_eq!(stats.staff_case_load[0].case_count, 1);
}

#[tokio::test]
async fn test_student_stats_recent_cases_capped_at_five() {
    let db = create_test_db().await;
    let student = create_test_user(&db, "s@example.org", "password123", UserRole::Student).await;
    for i in 1..=7 {
        create_test_case(
            &db,
            &format!("CASE-202608-{i:04}"),
            student.id,
            CaseStatus::Draft,
        )
        .await;
    }

    let stats = dashboard::get_student_stats(&db, student.id).await.unwrap();
    assert_eq!(stats.total_cases, 7);
    assert_eq!(stats.recent_cases.len(), 5);
}

#[tokio::test]
async fn test_completion_stats_empty_without_cases() {
    let db = create_test_db().await;
    let stats = dashboard::get_case_completion_stats(&db, None).await.unwrap();
    assert!(stats.is_empty());
}

#[tokio::test]
async fn test_completion_stats_single_completed_case() {
    let db = create_test_db().await;
    let student = create_test_user(&db, "s@example.org", "password123", UserRole::Student).await;
    let staff = create_test_user(&db, "t@example.org", "password123", UserRole::Teacher).await;
    let case = create_test_case(&db, "CASE-202608-0001", student.id, CaseStatus::Draft).await;

    let repo = CaseRepository::new(db.clone());
    repo.update_status(case.id, CaseStatus::Submitted, student.id, None)
        .await
        .unwrap();
    repo.update_status(case.id, CaseStatus::InReview, staff.id, None)
        .await
        .unwrap();
    repo.evaluate(case.id, 90, None, staff.id).await.unwrap();

    let stats = dashboard::get_case_completion_stats(&db, None).await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total, 1);
    assert_eq!(stats[0].completed, 1);
    assert_eq!(stats[0].completion_rate, "100.0");
    assert!(stats[0].avg_completion_days >= 0.0);
    assert!(stats[0].avg_completion_days < 1.0);
}

#[tokio::test]
async fn test_completion_stats_partial_rate() {
    let db = create_test_db().await;
    let student = create_test_user(&db, "s@example.org", "password123", UserRole::Student).await;
    let staff = create_test_user(&db, "t@example.org", "password123", UserRole::Teacher).await;

    let done = create_test_case(&db, "CASE-202608-0001", student.id, CaseStatus::Draft).await;
    create_test_case(&db, "CASE-202608-0002", student.id, CaseStatus::Draft).await;

    let repo = CaseRepository::new(db.clone());
    repo.update_status(done.id, CaseStatus::Submitted, student.id, None)
        .await
        .unwrap();
    repo.update_status(done.id, CaseStatus::InReview, staff.id, None)
        .await
        .unwrap();
    repo.evaluate(done.id, 75, None, staff.id).await.unwrap();

    let stats = dashboard::get_case_completion_stats(&db, None).await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total, 2);
    assert_eq!(stats[0].completed, 1);
    assert_eq!(stats[0].completion_rate, "50.0");
}

#[tokio::test]
async fn test_completion_stats_department_filter() {
    let db = create_test_db().await;
    let dept = create_test_department(&db, "Pharmacology", "PHARM").await;
    let insider = create_test_user_in_department(
        &db,
        "in@example.org",
        "password123",
        UserRole::Student,
        Some(dept.id),
    )
    .await;
    let outsider = create_test_user(&db, "out@example.org", "password123", UserRole::Student).await;

    create_test_case(&db, "CASE-202608-0001", insider.id, CaseStatus::Draft).await;
    create_test_case(&db, "CASE-202608-0002", outsider.id, CaseStatus::Draft).await;

    let stats = dashboard::get_case_completion_stats(&db, Some(dept.id))
        .await
        .unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total, 1);
    assert_eq!(stats[0].completion_rate, "0.0");
}

#[tokio::test]
async fn test_document_usage_groups_by_category() {
    let db = create_test_db().await;
    let uploader = create_test_user(&db, "u@example.org", "password123", UserRole::Teacher).await;
    let doc_a =
        common::create_test_document(&db, "DOC-202608-0001", uploader.id, "guideline").await;
    common::create_test_document(&db, "DOC-202608-0002", uploader.id, "guideline").await;
    common::create_test_document(&db, "DOC-202608-0003", uploader.id, "protocol").await;

    let documents = medcase::repositories::DocumentRepository::new(db.clone());
    documents
        .log_access(doc_a.id, Some(uploader.id), medcase::models::document::AccessType::View)
        .await
        .unwrap();
    documents
        .log_access(doc_a.id, None, medcase::models::document::AccessType::Download)
        .await
        .unwrap();

    let usage = dashboard::get_document_usage_stats(&db).await.unwrap();
    assert_eq!(usage.len(), 2);

    let guideline = usage.iter().find(|u| u.category == "guideline").unwrap();
    assert_eq!(guideline.document_count, 2);
    assert_eq!(guideline.access_count, 2);
    assert_eq!(guideline.top_documents[0].document_id, doc_a.id);

    let protocol = usage.iter().find(|u| u.category == "protocol").unwrap();
    assert_eq!(protocol.document_count, 1);
    assert_eq!(protocol.access_count, 0);
}
