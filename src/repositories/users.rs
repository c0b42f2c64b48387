//! User persistence, including the paired user+profile transaction.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::application::error::DatabaseError;
use crate::models::prelude::*;
use crate::repositories::base::{Page, Repository, SoftDelete};

#[derive(Clone)]
pub struct UserRepository {
    base: Repository<User>,
}

impl UserRepository {
    pub fn new(db: DbConn) -> Self {
        UserRepository {
            base: Repository::new(db, "user"),
        }
    }

    fn db(&self) -> &DbConn {
        self.base.db()
    }

    /// Fetch an active (not soft-deleted) user or fail with NotFound.
    pub async fn find_by_id(&self, id: i64) -> Result<user::Model, DatabaseError> {
        self.base
            .try_find_one(
                User::not_deleted().add(user::Column::Id.eq(id)),
            )
            .await?
            .ok_or_else(|| DatabaseError::not_found("user", id))
    }

    pub async fn try_find_by_id(&self, id: i64) -> Result<Option<user::Model>, DatabaseError> {
        self.base
            .try_find_one(User::not_deleted().add(user::Column::Id.eq(id)))
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DatabaseError> {
        self.base
            .try_find_one(User::not_deleted().add(user::Column::Email.eq(email)))
            .await
    }

    pub async fn find_profile(&self, user_id: i64) -> Result<Option<profile::Model>, DatabaseError> {
        Profile::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(self.db())
            .await
            .map_err(|e| DatabaseError::classify("profile", e))
    }

    pub async fn paginate(
        &self,
        cond: Condition,
        page: u64,
        per_page: u64,
    ) -> Result<Page<user::Model>, DatabaseError> {
        self.base
            .paginate(User::not_deleted().add(cond), page, per_page)
            .await
    }

    pub async fn count(&self, cond: Condition) -> Result<u64, DatabaseError> {
        self.base.count(User::not_deleted().add(cond)).await
    }

    /// Insert a user and its profile in one transaction. Either both rows
    /// land or neither does.
    pub async fn create_user_with_profile(
        &self,
        user: user::ActiveModel,
        mut profile: profile::ActiveModel,
    ) -> Result<(user::Model, profile::Model), DatabaseError> {
        let txn = self
            .db()
            .begin()
            .await
            .map_err(|e| DatabaseError::in_transaction("user", e))?;

        let user = user
            .insert(&txn)
            .await
            .map_err(|e| DatabaseError::in_transaction("user", e))?;

        profile.user_id = Set(user.id);
        let profile = profile
            .insert(&txn)
            .await
            .map_err(|e| DatabaseError::in_transaction("profile", e))?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::in_transaction("user", e))?;

        Ok((user, profile))
    }

    /// Update a user and its profile in one transaction.
    pub async fn update_user_with_profile(
        &self,
        user_id: i64,
        mut user_changes: user::ActiveModel,
        mut profile_changes: profile::ActiveModel,
    ) -> Result<(user::Model, profile::Model), DatabaseError> {
        let txn = self
            .db()
            .begin()
            .await
            .map_err(|e| DatabaseError::in_transaction("user", e))?;

        let existing = User::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| DatabaseError::in_transaction("user", e))?
            .ok_or_else(|| DatabaseError::not_found("user", user_id))?;

        let profile = Profile::find()
            .filter(profile::Column::UserId.eq(existing.id))
            .one(&txn)
            .await
            .map_err(|e| DatabaseError::in_transaction("profile", e))?
            .ok_or_else(|| DatabaseError::not_found("profile", user_id))?;

        user_changes.id = Set(existing.id);
        user_changes.updated_at = Set(Utc::now());
        let user = user_changes
            .update(&txn)
            .await
            .map_err(|e| DatabaseError::in_transaction("user", e))?;

        profile_changes.id = Set(profile.id);
        profile_changes.user_id = Set(existing.id);
        profile_changes.updated_at = Set(Utc::now());
        let profile = profile_changes
            .update(&txn)
            .await
            .map_err(|e| DatabaseError::in_transaction("profile", e))?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::in_transaction("user", e))?;

        Ok((user, profile))
    }

    /// Bump the failed-login counter; lock the account once the threshold
    /// is reached.
    pub async fn record_failed_login(
        &self,
        user_id: i64,
        max_failed: i32,
        lockout_minutes: i64,
    ) -> Result<user::Model, DatabaseError> {
        let user = self.find_by_id(user_id).await?;
        let failed = user.failed_login_count + 1;

        let mut active: user::ActiveModel = user.into();
        active.failed_login_count = Set(failed);
        if failed >= max_failed {
            active.locked_until = Set(Some(Utc::now() + Duration::minutes(lockout_minutes)));
        }
        active.updated_at = Set(Utc::now());
        active
            .update(self.db())
            .await
            .map_err(|e| DatabaseError::classify("user", e))
    }

    pub async fn clear_failed_logins(&self, user_id: i64) -> Result<(), DatabaseError> {
        let user = self.find_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();
        active.failed_login_count = Set(0);
        active.locked_until = Set(None);
        active.updated_at = Set(Utc::now());
        active
            .update(self.db())
            .await
            .map_err(|e| DatabaseError::classify("user", e))?;
        Ok(())
    }

    pub async fn soft_delete(&self, user_id: i64, deleted_by: Option<i64>) -> Result<(), DatabaseError> {
        self.base.delete_by_id(user_id, deleted_by).await
    }
}
