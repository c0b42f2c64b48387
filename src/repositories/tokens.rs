//! Refresh/verification token storage. Rows here are hard-deleted on
//! expiry by the purge task; there is no soft delete.

use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, DbConn, Set, Value};

use crate::application::error::DatabaseError;
use crate::models::auth_token::TokenType;
use crate::models::prelude::*;
use crate::repositories::base::Repository;

#[derive(Clone)]
pub struct TokenRepository {
    base: Repository<AuthToken>,
}

impl TokenRepository {
    pub fn new(db: DbConn) -> Self {
        TokenRepository {
            base: Repository::new(db, "auth_token"),
        }
    }

    pub async fn store(
        &self,
        user_id: i64,
        token: String,
        token_type: TokenType,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<auth_token::Model, DatabaseError> {
        self.base
            .create(auth_token::ActiveModel {
                user_id: Set(user_id),
                token: Set(token),
                token_type: Set(token_type.as_str().to_string()),
                expires_at: Set(expires_at),
                blacklisted: Set(false),
                created_at: Set(Utc::now()),
                ..Default::default()
            })
            .await
    }

    /// A stored token that is neither expired nor blacklisted.
    pub async fn find_valid(
        &self,
        token: &str,
        token_type: TokenType,
    ) -> Result<Option<auth_token::Model>, DatabaseError> {
        self.base
            .try_find_one(
                Condition::all()
                    .add(auth_token::Column::Token.eq(token))
                    .add(auth_token::Column::TokenType.eq(token_type.as_str()))
                    .add(auth_token::Column::Blacklisted.eq(false))
                    .add(auth_token::Column::ExpiresAt.gt(Utc::now())),
            )
            .await
    }

    pub async fn blacklist(&self, token: &str) -> Result<u64, DatabaseError> {
        self.base
            .update_many(
                Condition::all().add(auth_token::Column::Token.eq(token)),
                vec![(auth_token::Column::Blacklisted, Value::from(true))],
            )
            .await
    }

    pub async fn blacklist_all_for_user(&self, user_id: i64) -> Result<u64, DatabaseError> {
        self.base
            .update_many(
                Condition::all()
                    .add(auth_token::Column::UserId.eq(user_id))
                    .add(auth_token::Column::Blacklisted.eq(false)),
                vec![(auth_token::Column::Blacklisted, Value::from(true))],
            )
            .await
    }

    /// TTL cleanup. Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64, DatabaseError> {
        self.base
            .hard_delete_many(
                Condition::all().add(auth_token::Column::ExpiresAt.lt(Utc::now())),
            )
            .await
    }
}
