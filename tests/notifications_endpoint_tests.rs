//! Notification inbox scoping and read tracking.

use axum::http::{Method, StatusCode};

mod common;
use common::{access_token_for, create_test_state, create_test_user, send_request, test_app};

use medcase::models::notification::NotificationType;
use medcase::models::user::UserRole;
use medcase::repositories::NotificationRepository;

#[tokio::test]
async fn test_inbox_only_shows_own_notifications() {
    let state = create_test_state().await;
    let alice =
        create_test_user(&state.db, "alice@example.org", "password123", UserRole::Student).await;
    let bob = create_test_user(&state.db, "bob@example.org", "password123", UserRole::Student).await;

    let repo = NotificationRepository::new(state.db.clone());
    repo.create(alice.id, NotificationType::CaseAssigned, "For Alice".into(), "…".into())
        .await
        .unwrap();
    repo.create(bob.id, NotificationType::CaseAssigned, "For Bob".into(), "…".into())
        .await
        .unwrap();

    let (status, page) = send_request(
        test_app(state),
        Method::GET,
        "/api/notifications",
        Some(&access_token_for(&alice)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_items"], 1);
    assert_eq!(page["items"][0]["title"], "For Alice");
}

#[tokio::test]
async fn test_unread_count_and_mark_read() {
    let state = create_test_state().await;
    let user = create_test_user(&state.db, "u@example.org", "password123", UserRole::Student).await;
    let token = access_token_for(&user);

    let repo = NotificationRepository::new(state.db.clone());
    let first = repo
        .create(user.id, NotificationType::CaseEvaluated, "One".into(), "…".into())
        .await
        .unwrap();
    repo.create(user.id, NotificationType::CaseEvaluated, "Two".into(), "…".into())
        .await
        .unwrap();

    let (status, body) = send_request(
        test_app(state.clone()),
        Method::GET,
        "/api/notifications/unread-count",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unread"], 2);

    let (status, read) = send_request(
        test_app(state.clone()),
        Method::POST,
        &format!("/api/notifications/{}/read", first.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["read"], true);

    let (_, body) = send_request(
        test_app(state),
        Method::GET,
        "/api/notifications/unread-count",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["unread"], 1);
}

#[tokio::test]
async fn test_cannot_mark_anothers_notification() {
    let state = create_test_state().await;
    let alice =
        create_test_user(&state.db, "alice@example.org", "password123", UserRole::Student).await;
    let bob = create_test_user(&state.db, "bob@example.org", "password123", UserRole::Student).await;

    let note = NotificationRepository::new(state.db.clone())
        .create(alice.id, NotificationType::CaseAssigned, "Private".into(), "…".into())
        .await
        .unwrap();

    let (status, _) = send_request(
        test_app(state),
        Method::POST,
        &format!("/api/notifications/{}/read", note.id),
        Some(&access_token_for(&bob)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_read_all() {
    let state = create_test_state().await;
    let user = create_test_user(&state.db, "u@example.org", "password123", UserRole::Student).await;
    let token = access_token_for(&user);

    let repo = NotificationRepository::new(state.db.clone());
    for i in 0..3 {
        repo.create(
            user.id,
            NotificationType::CaseStatusChanged,
            format!("Note {i}"),
            "…".into(),
        )
        .await
        .unwrap();
    }

    let (status, body) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/api/notifications/read-all",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["marked_read"], 3);

    let (_, body) = send_request(
        test_app(state),
        Method::GET,
        "/api/notifications/unread-count",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["unread"], 0);
}
