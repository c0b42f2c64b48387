pub mod activity;
pub mod auth;
pub mod cases;
pub mod dashboard;
pub mod departments;
pub mod documents;
pub mod notifications;
pub mod qrcodes;
pub mod users;

use axum::{middleware as axum_middleware, Router};

use crate::application::config::CONFIG;
use crate::application::state::AppState;
use crate::middleware::require_auth;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", axum::routing::get(health_check))
        .route("/api/system/version", axum::routing::get(get_version))
        .nest("/auth", auth::auth_routes(state.clone()));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .nest("/api", api_routes(state.clone()))
        .nest("/qrcodes", qrcodes::qrcodes_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}

/// API routes under /api/* (protected by auth middleware)
fn api_routes(state: AppState) -> Router {
    Router::new()
        .nest("/users", users::users_routes(state.clone()))
        .nest("/cases", cases::cases_routes(state.clone()))
        .nest("/documents", documents::documents_routes(state.clone()))
        .nest("/departments", departments::departments_routes(state.clone()))
        .nest(
            "/notifications",
            notifications::notifications_routes(state.clone()),
        )
        .nest("/dashboard", dashboard::dashboard_routes(state.clone()))
        .nest("/activity", activity::activity_routes(state.clone()))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Version info endpoint
async fn get_version() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "build_time": CONFIG.build_time,
        "backend": "rust"
    }))
}
