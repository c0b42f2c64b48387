//! Shared setup for endpoint integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use medcase::endpoints::create_router;
use medcase::models::user::{self, UserRole};
use medcase::services::activity::ActivityService;
use medcase::services::notify::NotifyService;
use medcase::services::security;
use medcase::state::AppState;
pub use medcase::test_helpers::*;

/// Build an AppState backed by a fresh in-memory database.
pub async fn create_test_state() -> AppState {
    let db = create_test_db().await;
    let activity = ActivityService::new();
    let notify = NotifyService::new();
    activity.set_db(db.clone()).await;
    notify.set_db(db.clone()).await;
    AppState::new(db, activity, notify)
}

pub fn test_app(state: AppState) -> Router {
    create_router(state)
}

/// Mint a bearer token for an existing user, bypassing the login flow.
pub fn access_token_for(user: &user::Model) -> String {
    let role = user.role().unwrap_or(UserRole::Student);
    security::create_access_token(user.id, &user.email, role).expect("create access token")
}

/// Send a request and return status plus parsed JSON body (Null when empty).
pub async fn send_request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let (status, _headers, body) = send_request_full(app, method, uri, token, body).await;
    (status, body)
}

pub async fn send_request_full(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = app.oneshot(request).await.expect("send request");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, headers, json)
}
