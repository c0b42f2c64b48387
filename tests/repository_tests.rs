//! Repository layer behavior: not-found naming, soft delete, pagination.

use sea_orm::{ColumnTrait, Condition, EntityTrait};

mod common;
use common::{
    create_test_case, create_test_db, create_test_department, create_test_user,
};

use medcase::error::DatabaseError;
use medcase::models::case_record::CaseStatus;
use medcase::models::prelude::*;
use medcase::models::user::UserRole;
use medcase::repositories::{
    CaseRepository, DepartmentRepository, TokenRepository, UserRepository,
};

#[tokio::test]
async fn test_find_by_id_names_the_entity() {
    let db = create_test_db().await;
    let err = CaseRepository::new(db).find_by_id(99).await.unwrap_err();
    match err {
        DatabaseError::NotFound { entity, id } => {
            assert_eq!(entity, "case");
            assert_eq!(id, "99");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_soft_deleted_rows_vanish_from_reads() {
    let db = create_test_db().await;
    let admin = create_test_user(&db, "a@example.org", "password123", UserRole::Admin).await;
    let student = create_test_user(&db, "s@example.org", "password123", UserRole::Student).await;
    let case = create_test_case(&db, "CASE-202608-0001", student.id, CaseStatus::Draft).await;

    let repo = CaseRepository::new(db.clone());
    repo.soft_delete(case.id, Some(admin.id)).await.unwrap();

    assert!(repo.find_by_id(case.id).await.is_err());
    assert!(repo.find_by_number("CASE-202608-0001").await.unwrap().is_none());

    // The row itself survives with the tombstone columns set
    let raw = Case::find_by_id(case.id).one(&db).await.unwrap().unwrap();
    assert!(raw.is_deleted);
    assert!(raw.deleted_at.is_some());
    assert_eq!(raw.deleted_by, Some(admin.id));
}

#[tokio::test]
async fn test_soft_delete_missing_row_is_not_found() {
    let db = create_test_db().await;
    let err = CaseRepository::new(db)
        .soft_delete(404, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound { .. }));
}

#[tokio::test]
async fn test_find_by_email_ignores_deleted_accounts() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "x@example.org", "password123", UserRole::Student).await;

    let repo = UserRepository::new(db);
    assert!(repo.find_by_email("x@example.org").await.unwrap().is_some());

    repo.soft_delete(user.id, None).await.unwrap();
    assert!(repo.find_by_email("x@example.org").await.unwrap().is_none());
}

#[tokio::test]
async fn test_paginate_arithmetic() {
    let db = create_test_db().await;
    let student = create_test_user(&db, "s@example.org", "password123", UserRole::Student).await;
    for i in 1..=12 {
        create_test_case(
            &db,
            &format!("CASE-202608-{i:04}"),
            student.id,
            CaseStatus::Draft,
        )
        .await;
    }

    let page = CaseRepository::new(db)
        .paginate(Condition::all(), 2, 5)
        .await
        .unwrap();

    assert_eq!(page.total_items, 12);
    assert_eq!(page.items_per_page, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.items.len(), 5);
}

#[tokio::test]
async fn test_paginate_past_the_end_is_empty() {
    let db = create_test_db().await;
    let student = create_test_user(&db, "s@example.org", "password123", UserRole::Student).await;
    create_test_case(&db, "CASE-202608-0001", student.id, CaseStatus::Draft).await;

    let page = CaseRepository::new(db)
        .paginate(Condition::all(), 5, 10)
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 1);
}

#[tokio::test]
async fn test_token_purge_hard_deletes_expired_rows() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "u@example.org", "password123", UserRole::Student).await;

    let repo = TokenRepository::new(db.clone());
    let now = chrono::Utc::now();
    repo.store(
        user.id,
        "expired-token".to_string(),
        medcase::models::auth_token::TokenType::Refresh,
        now - chrono::Duration::hours(1),
    )
    .await
    .unwrap();
    repo.store(
        user.id,
        "live-token".to_string(),
        medcase::models::auth_token::TokenType::Refresh,
        now + chrono::Duration::hours(1),
    )
    .await
    .unwrap();

    let purged = repo.purge_expired().await.unwrap();
    assert_eq!(purged, 1);

    let remaining = AuthToken::find().all(&db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].token, "live-token");
}

#[tokio::test]
async fn test_blacklisted_token_is_not_valid() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "u@example.org", "password123", UserRole::Student).await;

    let repo = TokenRepository::new(db);
    repo.store(
        user.id,
        "tok".to_string(),
        medcase::models::auth_token::TokenType::Refresh,
        chrono::Utc::now() + chrono::Duration::hours(1),
    )
    .await
    .unwrap();

    assert!(repo
        .find_valid("tok", medcase::models::auth_token::TokenType::Refresh)
        .await
        .unwrap()
        .is_some());

    repo.blacklist("tok").await.unwrap();
    assert!(repo
        .find_valid("tok", medcase::models::auth_token::TokenType::Refresh)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_failed_login_lockout_threshold() {
    let db = create_test_db().await;
    let user = create_test_user(&db, "u@example.org", "password123", UserRole::Student).await;

    let repo = UserRepository::new(db);
    for i in 1..5 {
        let updated = repo.record_failed_login(user.id, 5, 30).await.unwrap();
        assert_eq!(updated.failed_login_count, i);
        assert!(updated.locked_until.is_none());
    }

    let locked = repo.record_failed_login(user.id, 5, 30).await.unwrap();
    assert_eq!(locked.failed_login_count, 5);
    assert!(locked.locked_until.is_some());

    repo.clear_failed_logins(user.id).await.unwrap();
    let cleared = repo.find_by_id(user.id).await.unwrap();
    assert_eq!(cleared.failed_login_count, 0);
    assert!(cleared.locked_until.is_none());
}

#[tokio::test]
async fn test_department_headcounts() {
    let db = create_test_db().await;
    let dept = create_test_department(&db, "Pharmacology", "PHARM").await;

    common::create_test_user_in_department(&db, "t1@example.org", "password123", UserRole::Teacher, Some(dept.id)).await;
    common::create_test_user_in_department(&db, "a1@example.org", "password123", UserRole::Admin, Some(dept.id)).await;
    common::create_test_user_in_department(&db, "s1@example.org", "password123", UserRole::Student, Some(dept.id)).await;
    common::create_test_user_in_department(&db, "s2@example.org", "password123", UserRole::Student, Some(dept.id)).await;
    // Outside the department
    create_test_user(&db, "s3@example.org", "password123", UserRole::Student).await;

    let repo = DepartmentRepository::new(db);
    assert_eq!(repo.staff_count(dept.id).await.unwrap(), 2);
    assert_eq!(repo.student_count(dept.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_case_search_by_number_and_text() {
    let db = create_test_db().await;
    let student = create_test_user(&db, "s@example.org", "password123", UserRole::Student).await;
    create_test_case(&db, "CASE-202608-0001", student.id, CaseStatus::Draft).await;

    let repo = CaseRepository::new(db);

    let by_number = repo.search("CASE-202608-0001").await.unwrap();
    assert_eq!(by_number.len(), 1);

    let by_title = repo.search("Hypertension").await.unwrap();
    assert_eq!(by_title.len(), 1);

    let nothing = repo.search("CASE-209901-9999").await.unwrap();
    assert!(nothing.is_empty());
}
