//! QR short-code generation and resolution.

use axum::http::{header, Method, StatusCode};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

mod common;
use common::{
    access_token_for, create_test_case, create_test_document, create_test_state,
    create_test_user, send_request, send_request_full, test_app,
};

use medcase::models::case_record::CaseStatus;
use medcase::models::prelude::*;
use medcase::models::user::UserRole;

#[tokio::test]
async fn test_generate_is_idempotent_per_resource() {
    let state = create_test_state().await;
    let teacher =
        create_test_user(&state.db, "t@example.org", "password123", UserRole::Teacher).await;
    let doc = create_test_document(&state.db, "DOC-202608-0001", teacher.id, "guideline").await;
    let token = access_token_for(&teacher);

    let body = serde_json::json!({ "resource_type": "document", "resource_id": doc.id });
    let (status, first) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/qrcodes/generate",
        Some(&token),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, second) = send_request(
        test_app(state),
        Method::POST,
        "/qrcodes/generate",
        Some(&token),
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["code"], second["code"]);
}

#[tokio::test]
async fn test_generate_rejects_missing_resource() {
    let state = create_test_state().await;
    let teacher =
        create_test_user(&state.db, "t@example.org", "password123", UserRole::Teacher).await;
    let token = access_token_for(&teacher);

    let (status, _) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/qrcodes/generate",
        Some(&token),
        Some(serde_json::json!({ "resource_type": "document", "resource_id": 404 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_request(
        test_app(state),
        Method::POST,
        "/qrcodes/generate",
        Some(&token),
        Some(serde_json::json!({ "resource_type": "planet", "resource_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resolve_redirects_and_logs_document_access() {
    let state = create_test_state().await;
    let teacher =
        create_test_user(&state.db, "t@example.org", "password123", UserRole::Teacher).await;
    let doc = create_test_document(&state.db, "DOC-202608-0001", teacher.id, "guideline").await;
    let token = access_token_for(&teacher);

    let (_, generated) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/qrcodes/generate",
        Some(&token),
        Some(serde_json::json!({ "resource_type": "document", "resource_id": doc.id })),
    )
    .await;
    let code = generated["code"].as_str().unwrap();

    let (status, headers, _) = send_request_full(
        test_app(state.clone()),
        Method::GET,
        &format!("/qrcodes/{code}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    let location = headers.get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.ends_with(&format!("/api/documents/{}", doc.id)));

    let accesses = DocumentAccessLog::find()
        .filter(document_access_log::Column::DocumentId.eq(doc.id))
        .all(&state.db)
        .await
        .unwrap();
    assert_eq!(accesses.len(), 1);
    assert_eq!(accesses[0].access_type, "qr");
}

#[tokio::test]
async fn test_resolve_case_code() {
    let state = create_test_state().await;
    let student =
        create_test_user(&state.db, "s@example.org", "password123", UserRole::Student).await;
    let case = create_test_case(&state.db, "CASE-202608-0001", student.id, CaseStatus::Draft).await;
    let token = access_token_for(&student);

    let (_, generated) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/qrcodes/generate",
        Some(&token),
        Some(serde_json::json!({ "resource_type": "case", "resource_id": case.id })),
    )
    .await;
    let code = generated["code"].as_str().unwrap();

    let (status, headers, _) = send_request_full(
        test_app(state),
        Method::GET,
        &format!("/qrcodes/{code}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    let location = headers.get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.ends_with(&format!("/api/cases/{}", case.id)));
}

#[tokio::test]
async fn test_info_does_not_log_access() {
    let state = create_test_state().await;
    let teacher =
        create_test_user(&state.db, "t@example.org", "password123", UserRole::Teacher).await;
    let doc = create_test_document(&state.db, "DOC-202608-0001", teacher.id, "guideline").await;
    let token = access_token_for(&teacher);

    let (_, generated) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/qrcodes/generate",
        Some(&token),
        Some(serde_json::json!({ "resource_type": "document", "resource_id": doc.id })),
    )
    .await;
    let code = generated["code"].as_str().unwrap();

    let (status, info) = send_request(
        test_app(state.clone()),
        Method::GET,
        &format!("/qrcodes/{code}/info"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["resource_type"], "document");
    assert_eq!(info["resource_id"], doc.id);
    assert!(info["url"].as_str().unwrap().contains("/api/documents/"));

    let accesses = DocumentAccessLog::find().all(&state.db).await.unwrap();
    assert!(accesses.is_empty());
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let state = create_test_state().await;
    let user =
        create_test_user(&state.db, "u@example.org", "password123", UserRole::Student).await;
    let token = access_token_for(&user);

    let (status, _) = send_request(
        test_app(state),
        Method::GET,
        "/qrcodes/ZZZZZZZZZZ",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lookup_code_for_resource() {
    let state = create_test_state().await;
    let teacher =
        create_test_user(&state.db, "t@example.org", "password123", UserRole::Teacher).await;
    let doc = create_test_document(&state.db, "DOC-202608-0001", teacher.id, "guideline").await;
    let token = access_token_for(&teacher);

    let (status, _) = send_request(
        test_app(state.clone()),
        Method::GET,
        &format!("/qrcodes/resource/document/{}", doc.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, generated) = send_request(
        test_app(state.clone()),
        Method::POST,
        "/qrcodes/generate",
        Some(&token),
        Some(serde_json::json!({ "resource_type": "document", "resource_id": doc.id })),
    )
    .await;

    let (status, found) = send_request(
        test_app(state),
        Method::GET,
        &format!("/qrcodes/resource/document/{}", doc.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["code"], generated["code"]);
}
