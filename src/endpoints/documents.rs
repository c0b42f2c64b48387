//! Document metadata CRUD, version rollover and access logging.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, Set};
use serde::Deserialize;
use validator::Validate;

use crate::application::error::{AppError, Result};
use crate::application::state::AppState;
use crate::middleware::{Authenticated, Authorized};
use crate::middleware::roles::AdminOnly;
use crate::models::activity_log::{ActivityAction, EntityType};
use crate::models::document::AccessType;
use crate::models::prelude::*;
use crate::models::user::UserRole;
use crate::repositories::{documents::NewFileMetadata, DocumentRepository, Page};

pub fn documents_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_documents).post(create_document))
        .route("/search", get(search_documents))
        .route(
            "/{document_id}",
            get(get_document)
                .patch(update_document)
                .delete(delete_document),
        )
        .route(
            "/{document_id}/versions",
            get(list_versions).post(add_version),
        )
        .route("/{document_id}/access", post(log_access))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub category: Option<String>,
    pub case_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub mime_type: String,
    #[validate(range(min = 0))]
    pub size_bytes: i64,
    #[validate(length(min = 1))]
    pub storage_path: String,
    pub case_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDocumentRequest {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub category: Option<String>,
    pub case_id: Option<Option<i64>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddVersionRequest {
    #[validate(length(min = 1))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub mime_type: String,
    #[validate(range(min = 0))]
    pub size_bytes: i64,
    #[validate(length(min = 1))]
    pub storage_path: String,
}

#[derive(Debug, Deserialize)]
pub struct LogAccessRequest {
    pub access_type: String,
}

/// GET /api/documents
async fn list_documents(
    Authenticated(_user): Authenticated,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<document::Model>>> {
    let mut cond = Condition::all();
    if let Some(category) = &params.category {
        cond = cond.add(document::Column::Category.eq(category.clone()));
    }
    if let Some(case_id) = params.case_id {
        cond = cond.add(document::Column::CaseId.eq(case_id));
    }

    let page = DocumentRepository::new(state.db.clone())
        .paginate(cond, params.page.unwrap_or(1), params.per_page.unwrap_or(20))
        .await?;
    Ok(Json(page))
}

/// GET /api/documents/search?q=
async fn search_documents(
    Authenticated(_user): Authenticated,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<document::Model>>> {
    let results = DocumentRepository::new(state.db.clone())
        .search(&params.q)
        .await?;
    Ok(Json(results))
}

/// POST /api/documents - register new file metadata
async fn create_document(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Json(body): Json<CreateDocumentRequest>,
) -> Result<Json<document::Model>> {
    body.validate()?;

    let documents = DocumentRepository::new(state.db.clone());
    let document_number = documents.next_document_number().await?;
    let now = Utc::now();
    let document = documents
        .create(document::ActiveModel {
            document_number: Set(document_number),
            title: Set(body.title),
            category: Set(body.category),
            file_name: Set(body.file_name),
            mime_type: Set(body.mime_type),
            size_bytes: Set(body.size_bytes),
            storage_path: Set(body.storage_path),
            version: Set(1),
            uploaded_by: Set(user.id),
            case_id: Set(body.case_id),
            is_deleted: Set(false),
            deleted_at: Set(None),
            deleted_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::DocumentCreated,
            EntityType::Document,
            Some(document.id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            Some(serde_json::json!({ "document_number": document.document_number })),
        )
        .await
        .ok();

    Ok(Json(document))
}

/// GET /api/documents/{document_id}
async fn get_document(
    Authenticated(_user): Authenticated,
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
) -> Result<Json<document::Model>> {
    let document = DocumentRepository::new(state.db.clone())
        .find_by_id(document_id)
        .await?;
    Ok(Json(document))
}

/// PATCH /api/documents/{document_id}
async fn update_document(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
    Json(body): Json<UpdateDocumentRequest>,
) -> Result<Json<document::Model>> {
    body.validate()?;

    let documents = DocumentRepository::new(state.db.clone());
    let existing = documents.find_by_id(document_id).await?;
    if existing.uploaded_by != user.id && user.role() != Some(UserRole::Admin) {
        return Err(AppError::Forbidden(
            "Only the uploader or an admin can modify a document".to_string(),
        ));
    }

    let mut changes = document::ActiveModel {
        ..Default::default()
    };
    if let Some(title) = body.title {
        changes.title = Set(title);
    }
    if let Some(category) = body.category {
        changes.category = Set(category);
    }
    if let Some(case_id) = body.case_id {
        changes.case_id = Set(case_id);
    }
    changes.updated_at = Set(Utc::now());

    let document = documents.update(document_id, changes).await?;

    state
        .activity
        .log_success(
            ActivityAction::DocumentUpdated,
            EntityType::Document,
            Some(document.id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(document))
}

/// DELETE /api/documents/{document_id} - admin only, soft delete
async fn delete_document(
    Authorized(admin, _): Authorized<AdminOnly>,
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    DocumentRepository::new(state.db.clone())
        .soft_delete(document_id, Some(admin.id))
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::DocumentDeleted,
            EntityType::Document,
            Some(document_id.to_string()),
            Some(admin.id),
            Some(admin.email.clone()),
            None,
        )
        .await
        .ok();

    Ok(Json(serde_json::json!({ "detail": "Document deleted" })))
}

/// GET /api/documents/{document_id}/versions - archived revisions
async fn list_versions(
    Authenticated(_user): Authenticated,
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
) -> Result<Json<Vec<document_version::Model>>> {
    let documents = DocumentRepository::new(state.db.clone());
    documents.find_by_id(document_id).await?;
    let versions = documents.versions(document_id).await?;
    Ok(Json(versions))
}

/// POST /api/documents/{document_id}/versions - version rollover
async fn add_version(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
    Json(body): Json<AddVersionRequest>,
) -> Result<Json<document::Model>> {
    body.validate()?;

    let document = DocumentRepository::new(state.db.clone())
        .add_version(
            document_id,
            NewFileMetadata {
                file_name: body.file_name,
                mime_type: body.mime_type,
                size_bytes: body.size_bytes,
                storage_path: body.storage_path,
            },
            user.id,
        )
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::DocumentVersionAdded,
            EntityType::Document,
            Some(document.id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            Some(serde_json::json!({ "version": document.version })),
        )
        .await
        .ok();

    Ok(Json(document))
}

/// POST /api/documents/{document_id}/access - record a view/download
async fn log_access(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(document_id): Path<i64>,
    Json(body): Json<LogAccessRequest>,
) -> Result<Json<document_access_log::Model>> {
    let access_type = AccessType::parse(&body.access_type).ok_or_else(|| {
        AppError::BadRequest(format!("unknown access type: {}", body.access_type))
    })?;

    let documents = DocumentRepository::new(state.db.clone());
    documents.find_by_id(document_id).await?;
    let entry = documents
        .log_access(document_id, Some(user.id), access_type)
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::DocumentAccessed,
            EntityType::Document,
            Some(document_id.to_string()),
            Some(user.id),
            Some(user.email.clone()),
            Some(serde_json::json!({ "access_type": body.access_type })),
        )
        .await
        .ok();

    Ok(Json(entry))
}
