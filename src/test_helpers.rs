//! Test helpers and utilities for unit and integration testing.
//!
//! This module provides common utilities for setting up test databases
//! and creating seed records for repository and endpoint tests.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use crate::migrations::Migrator;
use crate::models::case_record::CaseStatus;
use crate::models::prelude::*;
use crate::models::user::{UserRole, UserStatus};
use crate::services::security;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    // Each connection gets its own database
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Insert a user with a bcrypt-hashed password and a minimal profile.
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    role: UserRole,
) -> user::Model {
    create_test_user_in_department(db, email, password, role, None).await
}

pub async fn create_test_user_in_department(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    role: UserRole,
    department_id: Option<i64>,
) -> user::Model {
    let now = Utc::now();
    let hashed = security::hash_password(password).expect("hash password");

    let user = user::ActiveModel {
        email: Set(email.to_string()),
        hashed_password: Set(hashed),
        role: Set(role.as_str().to_string()),
        status: Set(UserStatus::Active.as_str().to_string()),
        failed_login_count: Set(0),
        locked_until: Set(None),
        department_id: Set(department_id),
        is_deleted: Set(false),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert test user");

    profile::ActiveModel {
        user_id: Set(user.id),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        phone: Set(None),
        student_details: Set(None),
        staff_details: Set(None),
        preferences: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert test profile");

    user
}

pub async fn create_test_department(db: &DatabaseConnection, name: &str, code: &str) -> department::Model {
    let now = Utc::now();
    department::ActiveModel {
        name: Set(name.to_string()),
        code: Set(code.to_string()),
        parent_department_id: Set(None),
        is_deleted: Set(false),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert test department")
}

pub async fn create_test_case(
    db: &DatabaseConnection,
    case_number: &str,
    student_id: i64,
    status: CaseStatus,
) -> case_record::Model {
    let now = Utc::now();
    case_record::ActiveModel {
        case_number: Set(case_number.to_string()),
        student_id: Set(student_id),
        assigned_staff_id: Set(None),
        title: Set("Hypertension follow-up".to_string()),
        patient_info: Set(None),
        medication_history: Set(None),
        lab_values: Set(None),
        assessment: Set(None),
        plan: Set(None),
        status: Set(status.as_str().to_string()),
        evaluation_score: Set(None),
        evaluation_feedback: Set(None),
        is_deleted: Set(false),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert test case")
}

pub async fn create_test_document(
    db: &DatabaseConnection,
    document_number: &str,
    uploaded_by: i64,
    category: &str,
) -> document::Model {
    let now = Utc::now();
    document::ActiveModel {
        document_number: Set(document_number.to_string()),
        title: Set("Dosage guideline".to_string()),
        category: Set(category.to_string()),
        file_name: Set("guideline.pdf".to_string()),
        mime_type: Set("application/pdf".to_string()),
        size_bytes: Set(1024),
        storage_path: Set(format!("store/{document_number}.pdf")),
        version: Set(1),
        uploaded_by: Set(uploaded_by),
        case_id: Set(None),
        is_deleted: Set(false),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert test document")
}
