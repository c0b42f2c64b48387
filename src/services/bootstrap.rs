//! First-run setup: seed the default admin account.

use chrono::Utc;
use sea_orm::{EntityTrait, PaginatorTrait, Set};

use crate::application::config::CONFIG;
use crate::application::error::{DatabaseError, Result};
use crate::db::DbConn;
use crate::models::prelude::*;
use crate::models::user::{UserRole, UserStatus};
use crate::repositories::UserRepository;
use crate::services::security;

/// Seed a default admin user (with profile) when the users table is empty.
/// Returns the created user, or `None` when users already exist.
pub async fn ensure_admin(db: &DbConn) -> Result<Option<user::Model>> {
    let existing = User::find()
        .count(db)
        .await
        .map_err(|e| DatabaseError::classify("user", e))?;
    if existing > 0 {
        return Ok(None);
    }

    let (password, generated) = match CONFIG.auth.bootstrap_admin_password.clone() {
        Some(password) => (password, false),
        None => (security::generate_secure_password(16), true),
    };
    let hashed = security::hash_password(&password)?;

    let now = Utc::now();
    let user = user::ActiveModel {
        email: Set(CONFIG.auth.bootstrap_admin_email.clone()),
        hashed_password: Set(hashed),
        role: Set(UserRole::Admin.as_str().to_string()),
        status: Set(UserStatus::Active.as_str().to_string()),
        failed_login_count: Set(0),
        locked_until: Set(None),
        department_id: Set(None),
        is_deleted: Set(false),
        deleted_at: Set(None),
        deleted_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let profile = profile::ActiveModel {
        first_name: Set("System".to_string()),
        last_name: Set("Administrator".to_string()),
        phone: Set(None),
        student_details: Set(None),
        staff_details: Set(None),
        preferences: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let (user, _) = UserRepository::new(db.clone())
        .create_user_with_profile(user, profile)
        .await?;

    if generated {
        tracing::warn!(
            "Created bootstrap admin {} with generated password: {}",
            user.email,
            password
        );
    } else {
        tracing::info!("Created bootstrap admin {}", user.email);
    }

    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_db;

    #[tokio::test]
    async fn test_seeds_admin_into_empty_database() {
        let db = create_test_db().await;

        let created = ensure_admin(&db).await.unwrap();
        let admin = created.expect("admin should be seeded");
        assert_eq!(admin.role, "admin");
        assert_eq!(admin.email, CONFIG.auth.bootstrap_admin_email);

        // Profile lands in the same transaction
        let profile = UserRepository::new(db.clone())
            .find_profile(admin.id)
            .await
            .unwrap();
        assert!(profile.is_some());
    }

    #[tokio::test]
    async fn test_noop_when_users_exist() {
        let db = create_test_db().await;

        assert!(ensure_admin(&db).await.unwrap().is_some());
        assert!(ensure_admin(&db).await.unwrap().is_none());
    }
}
