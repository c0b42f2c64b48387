//! Login, token refresh and logout.

use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::config::CONFIG;
use crate::application::error::{AppError, Result};
use crate::application::state::AppState;
use crate::models::activity_log::{ActivityAction, EntityType};
use crate::models::auth_token::TokenType;
use crate::models::user::{self, UserStatus};
use crate::repositories::{TokenRepository, UserRepository};
use crate::services::security;

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .with_state(state)
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub user: user::Model,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

async fn issue_tokens(state: &AppState, user: &user::Model) -> Result<TokenResponse> {
    let role = user
        .role()
        .ok_or_else(|| AppError::Internal(format!("unknown role: {}", user.role)))?;

    let access_token = security::create_access_token(user.id, &user.email, role)?;
    let refresh_token = security::create_refresh_token(user.id, &user.email)?;

    TokenRepository::new(state.db.clone())
        .store(
            user.id,
            refresh_token.clone(),
            TokenType::Refresh,
            Utc::now() + Duration::seconds(CONFIG.auth.refresh_token_ttl),
        )
        .await?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
        user: user.clone(),
    })
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    body.validate()?;

    let users = UserRepository::new(state.db.clone());
    let user = match users.find_by_email(&body.email).await? {
        Some(user) => user,
        None => {
            state
                .activity
                .log_failure(
                    ActivityAction::LoginFailed,
                    EntityType::User,
                    None,
                    None,
                    Some(body.email.clone()),
                    "unknown email",
                )
                .await
                .ok();
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }
    };

    let now = Utc::now();
    if user.is_locked(now) {
        state
            .activity
            .log_failure(
                ActivityAction::LoginFailed,
                EntityType::User,
                Some(user.id.to_string()),
                Some(user.id),
                Some(user.email.clone()),
                "account locked",
            )
            .await
            .ok();
        return Err(AppError::Unauthorized(
            "Account locked due to repeated failed logins".to_string(),
        ));
    }

    if !security::verify_password(&body.password, &user.hashed_password) {
        let updated = users
            .record_failed_login(
                user.id,
                CONFIG.auth.max_failed_logins,
                CONFIG.auth.lockout_minutes,
            )
            .await?;

        if updated.locked_until.is_some() {
            state
                .activity
                .log_failure(
                    ActivityAction::AccountLocked,
                    EntityType::User,
                    Some(user.id.to_string()),
                    Some(user.id),
                    Some(user.email.clone()),
                    "too many failed logins",
                )
                .await
                .ok();
        } else {
            state
                .activity
                .log_failure(
                    ActivityAction::LoginFailed,
                    EntityType::User,
                    Some(user.id.to_string()),
                    Some(user.id),
                    Some(user.email.clone()),
                    "wrong password",
                )
                .await
                .ok();
        }
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    if user.status != UserStatus::Active.as_str() {
        return Err(AppError::Unauthorized("Account is not active".to_string()));
    }

    users.clear_failed_logins(user.id).await?;

    let response = issue_tokens(&state, &user).await?;

    state
        .activity
        .log_success(
            ActivityAction::Login,
            EntityType::User,
            Some(user.id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(response))
}

/// POST /auth/refresh - rotate a stored refresh token
async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>> {
    let claims = security::decode_token(&body.refresh_token)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;
    if claims.token_type.as_deref() != Some("refresh") {
        return Err(AppError::Unauthorized(
            "Not a refresh token".to_string(),
        ));
    }

    let tokens = TokenRepository::new(state.db.clone());
    let stored = tokens
        .find_valid(&body.refresh_token, TokenType::Refresh)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Refresh token expired or revoked".to_string()))?;

    let user = UserRepository::new(state.db.clone())
        .try_find_by_id(stored.user_id)
        .await?
        .filter(|u| u.status == UserStatus::Active.as_str())
        .ok_or_else(|| AppError::Unauthorized("User not found or inactive".to_string()))?;

    // Rotation: the presented token is dead from here on
    tokens.blacklist(&body.refresh_token).await?;

    let response = issue_tokens(&state, &user).await?;

    state
        .activity
        .log_success(
            ActivityAction::TokenRefresh,
            EntityType::Token,
            Some(stored.id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(response))
}

/// POST /auth/logout - blacklist the presented refresh token
async fn logout(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> Result<Json<serde_json::Value>> {
    let tokens = TokenRepository::new(state.db.clone());
    tokens.blacklist(&body.refresh_token).await?;

    if let Ok(claims) = security::decode_token(&body.refresh_token) {
        if let Ok(user_id) = claims.user_id() {
            state
                .activity
                .log_success(
                    ActivityAction::Logout,
                    EntityType::User,
                    Some(user_id.to_string()),
                    Some(user_id),
                    claims.email,
                    None,
                )
                .await
                .ok();
        }
    }

    Ok(Json(serde_json::json!({ "detail": "Logged out" })))
}
