//! Authentication middleware for API routes
//!
//! Requires a valid Bearer access token on every route it is mounted on.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::application::state::AppState;
use crate::models::prelude::*;
use crate::models::user::{self, UserStatus};
use crate::services::security::decode_token;

/// Authenticated user stored in request extensions
#[derive(Clone)]
pub struct AuthenticatedUser(pub user::Model);

/// Auth middleware that validates Bearer tokens
///
/// Returns 401 Unauthorized if the token is missing, invalid, or the user
/// behind it is no longer active.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    // Extract Bearer token from Authorization header
    let token = match extract_bearer_token(&req) {
        Some(t) => t,
        None => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    // Validate token and get user
    let user = match validate_token_and_get_user(&state, &token).await {
        Ok(u) => u,
        Err(msg) => {
            return unauthorized_response(&msg);
        }
    };

    // Add authenticated user to request extensions
    req.extensions_mut().insert(AuthenticatedUser(user));

    next.run(req).await
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.headers().get(AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    Some(token.to_string())
}

/// Validate JWT token and fetch the user from the database
async fn validate_token_and_get_user(state: &AppState, token: &str) -> Result<user::Model, String> {
    // Decode and validate the token
    let claims = decode_token(token).map_err(|_| "Invalid or expired token".to_string())?;

    // Refresh tokens are for /auth/refresh only
    if claims.token_type.as_deref() == Some("refresh") {
        return Err("Refresh tokens cannot be used for API access".to_string());
    }

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| "Invalid token subject".to_string())?;

    let found_user = User::find_by_id(user_id)
        .filter(user::Column::IsDeleted.eq(false))
        .filter(user::Column::Status.eq(UserStatus::Active.as_str()))
        .one(&state.db)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    found_user.ok_or_else(|| "User not found or inactive".to_string())
}

/// Create a 401 Unauthorized JSON response
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "detail": message
        })),
    )
        .into_response()
}
