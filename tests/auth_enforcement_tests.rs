//! Authentication and role enforcement across the protected surface.

use axum::http::{Method, StatusCode};

mod common;
use common::{access_token_for, create_test_state, create_test_user, send_request, test_app};

use medcase::models::user::UserRole;

#[tokio::test]
async fn test_health_is_public() {
    let state = create_test_state().await;
    let (status, _) = send_request(test_app(state), Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_version_is_public() {
    let state = create_test_state().await;
    let (status, body) =
        send_request(test_app(state), Method::GET, "/api/system/version", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let state = create_test_state().await;
    let (status, _) = send_request(test_app(state), Method::GET, "/api/cases", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let state = create_test_state().await;
    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/api/cases",
        Some("not-a-jwt"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_rejected_as_bearer() {
    let state = create_test_state().await;
    let user = create_test_user(&state.db, "s@example.org", "password123", UserRole::Student).await;
    let refresh =
        medcase::services::security::create_refresh_token(user.id, &user.email).unwrap();

    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/api/cases",
        Some(&refresh),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_student_cannot_list_users() {
    let state = create_test_state().await;
    let student =
        create_test_user(&state.db, "s@example.org", "password123", UserRole::Student).await;
    let token = access_token_for(&student);

    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/api/users",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_view_system_dashboard() {
    let state = create_test_state().await;
    let student =
        create_test_user(&state.db, "s@example.org", "password123", UserRole::Student).await;
    let token = access_token_for(&student);

    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/api/dashboard/system",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_student_cannot_view_activity_log() {
    let state = create_test_state().await;
    let student =
        create_test_user(&state.db, "s@example.org", "password123", UserRole::Student).await;
    let token = access_token_for(&student);

    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/api/activity",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_teacher_counts_as_staff_for_dashboard() {
    let state = create_test_state().await;
    let teacher =
        create_test_user(&state.db, "t@example.org", "password123", UserRole::Teacher).await;
    let token = access_token_for(&teacher);

    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/api/dashboard/staff",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_teacher_is_not_admin() {
    let state = create_test_state().await;
    let teacher =
        create_test_user(&state.db, "t@example.org", "password123", UserRole::Teacher).await;
    let token = access_token_for(&teacher);

    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/api/dashboard/system",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_reaches_admin_surface() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;
    let token = access_token_for(&admin);

    let (status, _) = send_request(
        test_app(state.clone()),
        Method::GET,
        "/api/users",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/api/dashboard/system",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_soft_deleted_user_token_rejected() {
    let state = create_test_state().await;
    let user = create_test_user(&state.db, "gone@example.org", "password123", UserRole::Student).await;
    let token = access_token_for(&user);

    medcase::repositories::UserRepository::new(state.db.clone())
        .soft_delete(user.id, None)
        .await
        .unwrap();

    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/api/cases",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
