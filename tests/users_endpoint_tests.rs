//! User administration endpoints.

use axum::http::{Method, StatusCode};

mod common;
use common::{access_token_for, create_test_state, create_test_user, send_request, test_app};

use medcase::models::user::UserRole;

#[tokio::test]
async fn test_me_returns_user_with_profile() {
    let state = create_test_state().await;
    let user = create_test_user(&state.db, "me@example.org", "password123", UserRole::Student).await;

    let (status, body) = send_request(
        test_app(state),
        Method::GET,
        "/api/users/me",
        Some(&access_token_for(&user)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "me@example.org");
    assert_eq!(body["profile"]["first_name"], "Test");
    assert!(body["hashed_password"].is_null());
}

#[tokio::test]
async fn test_admin_creates_user_with_profile() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;

    let (status, body) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/api/users",
        Some(&access_token_for(&admin)),
        Some(serde_json::json!({
            "email": "new@example.org",
            "password": "password123",
            "role": "student",
            "first_name": "Nina",
            "last_name": "Novak",
            "student_details": { "year": 4 }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "new@example.org");
    assert_eq!(body["role"], "student");
    assert_eq!(body["profile"]["first_name"], "Nina");

    // The account can log in right away
    let (status, _) = send_request(
        test_app(state),
        Method::POST,
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": "new@example.org", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;
    create_test_user(&state.db, "taken@example.org", "password123", UserRole::Student).await;

    let (status, _) = send_request(
        test_app(state),
        Method::POST,
        "/api/users",
        Some(&access_token_for(&admin)),
        Some(serde_json::json!({
            "email": "taken@example.org",
            "password": "password123",
            "role": "student",
            "first_name": "Dup",
            "last_name": "Licate"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_role_rejected() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;

    let (status, _) = send_request(
        test_app(state),
        Method::POST,
        "/api/users",
        Some(&access_token_for(&admin)),
        Some(serde_json::json!({
            "email": "x@example.org",
            "password": "password123",
            "role": "superuser",
            "first_name": "X",
            "last_name": "Y"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_short_password_rejected() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;

    let (status, _) = send_request(
        test_app(state),
        Method::POST,
        "/api/users",
        Some(&access_token_for(&admin)),
        Some(serde_json::json!({
            "email": "x@example.org",
            "password": "short",
            "role": "student",
            "first_name": "X",
            "last_name": "Y"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user_and_profile_together() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;
    let user = create_test_user(&state.db, "u@example.org", "password123", UserRole::Student).await;

    let (status, body) = send_request(
        test_app(state),
        Method::PATCH,
        &format!("/api/users/{}", user.id),
        Some(&access_token_for(&admin)),
        Some(serde_json::json!({
            "role": "teacher",
            "first_name": "Promoted"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "teacher");
    assert_eq!(body["profile"]["first_name"], "Promoted");
}

#[tokio::test]
async fn test_delete_user_revokes_sessions() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;
    create_test_user(&state.db, "gone@example.org", "password123", UserRole::Student).await;

    // Establish a refresh token for the victim
    let (_, login) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": "gone@example.org", "password": "password123" })),
    )
    .await;
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();
    let user_id = login["user"]["id"].as_i64().unwrap();

    let (status, _) = send_request(
        test_app(state.clone()),
        Method::DELETE,
        &format!("/api/users/{user_id}"),
        Some(&access_token_for(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_request(
        test_app(state),
        Method::POST,
        "/auth/refresh",
        None,
        Some(serde_json::json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;

    let (status, _) = send_request(
        test_app(state),
        Method::DELETE,
        &format!("/api/users/{}", admin.id),
        Some(&access_token_for(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users_filters() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;
    create_test_user(&state.db, "s1@example.org", "password123", UserRole::Student).await;
    create_test_user(&state.db, "s2@example.org", "password123", UserRole::Student).await;
    let token = access_token_for(&admin);

    let (status, page) = send_request(
        test_app(state.clone()),
        Method::GET,
        "/api/users?role=student",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_items"], 2);

    let (_, page) = send_request(
        test_app(state),
        Method::GET,
        "/api/users?q=s1%40",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(page["total_items"], 1);
    assert_eq!(page["items"][0]["email"], "s1@example.org");
}
