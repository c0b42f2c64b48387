//! Short-code resolution and generation for documents and cases.

use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::application::config::CONFIG;
use crate::application::error::{AppError, Result};
use crate::application::state::AppState;
use crate::middleware::Authenticated;
use crate::models::activity_log::{ActivityAction, EntityType};
use crate::models::document::AccessType;
use crate::models::prelude::*;
use crate::models::qr_code::QrResourceType;
use crate::repositories::{CaseRepository, DocumentRepository, QrCodeRepository};

pub fn qrcodes_routes(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate_code))
        .route("/resource/{resource_type}/{resource_id}", get(code_for_resource))
        .route("/{code}", get(resolve_code))
        .route("/{code}/info", get(code_info))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub resource_type: String,
    pub resource_id: i64,
}

fn resource_url(resource_type: QrResourceType, resource_id: i64) -> String {
    let base = CONFIG.public_base_url.trim_end_matches('/');
    match resource_type {
        QrResourceType::Document => format!("{base}/api/documents/{resource_id}"),
        QrResourceType::Case => format!("{base}/api/cases/{resource_id}"),
    }
}

async fn lookup(state: &AppState, code: &str) -> Result<(qr_code::Model, QrResourceType)> {
    let mapping = QrCodeRepository::new(state.db.clone())
        .find_by_code(code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Unknown code: {code}")))?;
    let resource_type = QrResourceType::parse(&mapping.resource_type)
        .ok_or_else(|| AppError::Internal(format!("corrupt mapping for code {code}")))?;
    Ok((mapping, resource_type))
}

/// GET /qrcodes/{code} - 307 to the resource the code points at
async fn resolve_code(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Redirect> {
    let (mapping, resource_type) = lookup(&state, &code).await?;

    // Scanning a document code counts as a document access.
    if resource_type == QrResourceType::Document {
        DocumentRepository::new(state.db.clone())
            .log_access(mapping.resource_id, Some(user.id), AccessType::Qr)
            .await?;
    }

    state
        .activity
        .log_success(
            ActivityAction::QrCodeResolved,
            EntityType::QrCode,
            Some(mapping.code.clone()),
            Some(user.id),
            Some(user.email.clone()),
            Some(serde_json::json!({
                "resource_type": mapping.resource_type,
                "resource_id": mapping.resource_id,
            })),
        )
        .await
        .ok();

    Ok(Redirect::temporary(&resource_url(
        resource_type,
        mapping.resource_id,
    )))
}

/// GET /qrcodes/{code}/info - mapping details without following the link
async fn code_info(
    Authenticated(_user): Authenticated,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let (mapping, resource_type) = lookup(&state, &code).await?;
    Ok(Json(serde_json::json!({
        "code": mapping.code,
        "resource_type": mapping.resource_type,
        "resource_id": mapping.resource_id,
        "url": resource_url(resource_type, mapping.resource_id),
        "created_at": mapping.created_at,
    })))
}

/// POST /qrcodes/generate - mint (or reuse) a code for a resource
async fn generate_code(
    Authenticated(user): Authenticated,
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<qr_code::Model>> {
    let resource_type = QrResourceType::parse(&body.resource_type).ok_or_else(|| {
        AppError::BadRequest(format!("unknown resource type: {}", body.resource_type))
    })?;

    // The target must exist before a code is handed out.
    match resource_type {
        QrResourceType::Document => {
            DocumentRepository::new(state.db.clone())
                .find_by_id(body.resource_id)
                .await?;
        }
        QrResourceType::Case => {
            CaseRepository::new(state.db.clone())
                .find_by_id(body.resource_id)
                .await?;
        }
    }

    let mapping = QrCodeRepository::new(state.db.clone())
        .generate(resource_type, body.resource_id, user.id)
        .await?;

    state
        .activity
        .log_success(
            ActivityAction::QrCodeGenerated,
            EntityType::QrCode,
            Some(mapping.code.clone()),
            Some(user.id),
            Some(user.email.clone()),
            Some(serde_json::json!({
                "resource_type": mapping.resource_type,
                "resource_id": mapping.resource_id,
            })),
        )
        .await
        .ok();

    Ok(Json(mapping))
}

/// GET /qrcodes/resource/{resource_type}/{resource_id}
async fn code_for_resource(
    Authenticated(_user): Authenticated,
    State(state): State<AppState>,
    Path((resource_type, resource_id)): Path<(String, i64)>,
) -> Result<Json<qr_code::Model>> {
    let resource_type = QrResourceType::parse(&resource_type).ok_or_else(|| {
        AppError::BadRequest(format!("unknown resource type: {resource_type}"))
    })?;

    let mapping = QrCodeRepository::new(state.db.clone())
        .find_for_resource(resource_type, resource_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No code for {} {resource_id}",
                resource_type.as_str()
            ))
        })?;
    Ok(Json(mapping))
}
