//! Audit trail recording, querying and retention.

use axum::http::{Method, StatusCode};

mod common;
use common::{access_token_for, create_test_state, create_test_user, send_request, test_app};

use medcase::models::activity_log::{ActivityAction, EntityType};
use medcase::models::user::UserRole;
use medcase::services::activity::{self, ActivityLogQuery};

fn empty_query() -> ActivityLogQuery {
    ActivityLogQuery {
        page: None,
        per_page: None,
        user_id: None,
        action: None,
        entity_type: None,
        success: None,
        from: None,
        to: None,
        search: None,
    }
}

#[tokio::test]
async fn test_login_attempts_are_recorded() {
    let state = create_test_state().await;
    create_test_user(&state.db, "u@example.org", "password123", UserRole::Student).await;

    send_request(
        test_app(state.clone()),
        Method::POST,
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": "u@example.org", "password": "password123" })),
    )
    .await;
    send_request(
        test_app(state.clone()),
        Method::POST,
        "/auth/login",
        None,
        Some(serde_json::json!({ "email": "u@example.org", "password": "wrong" })),
    )
    .await;

    let logs = activity::get_activity_logs(&state.db, empty_query())
        .await
        .unwrap();
    assert_eq!(logs.total, 2);

    let failures = activity::get_activity_logs(
        &state.db,
        ActivityLogQuery {
            success: Some(false),
            ..empty_query()
        },
    )
    .await
    .unwrap();
    assert_eq!(failures.total, 1);
    assert_eq!(failures.logs[0].action, "login_failed");
}

#[tokio::test]
async fn test_filter_by_action_and_search() {
    let state = create_test_state().await;
    state
        .activity
        .log_success(
            ActivityAction::CaseCreated,
            EntityType::Case,
            Some("1".to_string()),
            Some(7),
            Some("s@example.org".to_string()),
            None,
        )
        .await
        .unwrap();
    state
        .activity
        .log_success(
            ActivityAction::DocumentCreated,
            EntityType::Document,
            Some("2".to_string()),
            Some(7),
            Some("s@example.org".to_string()),
            None,
        )
        .await
        .unwrap();

    let by_action = activity::get_activity_logs(
        &state.db,
        ActivityLogQuery {
            action: Some("case_created".to_string()),
            ..empty_query()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_action.total, 1);

    let by_search = activity::get_activity_logs(
        &state.db,
        ActivityLogQuery {
            search: Some("document_created".to_string()),
            ..empty_query()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_search.total, 1);
}

#[tokio::test]
async fn test_logs_ordered_newest_first() {
    let state = create_test_state().await;
    for i in 0..3 {
        state
            .activity
            .log_success(
                ActivityAction::CaseUpdated,
                EntityType::Case,
                Some(i.to_string()),
                None,
                None,
                None,
            )
            .await
            .unwrap();
    }

    let logs = activity::get_activity_logs(&state.db, empty_query())
        .await
        .unwrap();
    assert!(logs
        .logs
        .windows(2)
        .all(|w| w[0].timestamp >= w[1].timestamp));
}

#[tokio::test]
async fn test_clear_endpoint_removes_old_entries() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;

    state
        .activity
        .log_success(
            ActivityAction::CaseCreated,
            EntityType::Case,
            Some("1".to_string()),
            None,
            None,
            None,
        )
        .await
        .unwrap();

    // Everything is recent, so a 30-day retention removes nothing
    let (status, body) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/api/activity/clear",
        Some(&access_token_for(&admin)),
        Some(serde_json::json!({ "days": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 0);

    // Zero-day retention clears the lot
    let (status, body) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/api/activity/clear",
        Some(&access_token_for(&admin)),
        Some(serde_json::json!({ "days": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["removed"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn test_admin_lists_activity_over_http() {
    let state = create_test_state().await;
    let admin = create_test_user(&state.db, "a@example.org", "password123", UserRole::Admin).await;

    state
        .activity
        .log_success(
            ActivityAction::UserCreated,
            EntityType::User,
            Some("5".to_string()),
            Some(admin.id),
            Some(admin.email.clone()),
            None,
        )
        .await
        .unwrap();

    let (status, body) = send_request(
        test_app(state),
        Method::GET,
        "/api/activity?action=user_created",
        Some(&access_token_for(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["logs"][0]["entity_type"], "user");
}
