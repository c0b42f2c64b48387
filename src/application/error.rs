use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Uniform classification for persistence failures. Raw `DbErr` values
/// never cross the repository boundary; they are translated here so the
/// HTTP layer can map them to stable status codes.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("query failed for {entity}: {source}")]
    Query {
        entity: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("transaction failed for {entity}: {source}")]
    Transaction {
        entity: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("database connection error: {0}")]
    Connection(#[source] DbErr),
}

impl DatabaseError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DatabaseError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Translate a driver error for a read/write against `entity`.
    pub fn classify(entity: &'static str, source: DbErr) -> Self {
        match source {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => DatabaseError::Connection(source),
            DbErr::RecordNotFound(detail) => DatabaseError::NotFound {
                entity,
                id: detail,
            },
            DbErr::RecordNotUpdated => DatabaseError::not_found(entity, "no matching record"),
            other => DatabaseError::Query {
                entity,
                source: other,
            },
        }
    }

    /// Translate a driver error raised inside an aborted transaction.
    pub fn in_transaction(entity: &'static str, source: DbErr) -> Self {
        match source {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => DatabaseError::Connection(source),
            other => DatabaseError::Transaction {
                entity,
                source: other,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, errors.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Database(db) => match db {
                DatabaseError::NotFound { .. } => (StatusCode::NOT_FOUND, db.to_string()),
                DatabaseError::Connection(e) => {
                    tracing::error!("Database connection error: {}", e);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Database unavailable".to_string(),
                    )
                }
                DatabaseError::Query { entity, source } => {
                    tracing::error!("Query failed for {}: {}", entity, source);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database error".to_string(),
                    )
                }
                DatabaseError::Transaction { entity, source } => {
                    tracing::error!("Transaction failed for {}: {}", entity, source);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database error".to_string(),
                    )
                }
            },
            AppError::Json(e) => (StatusCode::BAD_REQUEST, format!("JSON error: {}", e)),
            AppError::Jwt(e) => (StatusCode::UNAUTHORIZED, format!("JWT error: {}", e)),
            AppError::Bcrypt(e) => {
                tracing::error!("Bcrypt error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    async fn get_response_body(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        let body_str = String::from_utf8(bytes.to_vec()).unwrap();
        (status, body_str)
    }

    #[tokio::test]
    async fn test_not_found_error() {
        let error = AppError::NotFound("Case not found".to_string());
        let (status, body) = get_response_body(error.into_response()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Case not found"));
    }

    #[tokio::test]
    async fn test_database_not_found_maps_to_404() {
        let error = AppError::Database(DatabaseError::not_found("case", 42));
        let (status, body) = get_response_body(error.into_response()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("case"));
        assert!(body.contains("42"));
    }

    #[tokio::test]
    async fn test_database_query_error_does_not_leak_detail() {
        let error = AppError::Database(DatabaseError::Query {
            entity: "user",
            source: DbErr::Custom("secret column missing".to_string()),
        });
        let (status, body) = get_response_body(error.into_response()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("secret column"));
    }

    #[tokio::test]
    async fn test_connection_error_maps_to_503() {
        let error = AppError::Database(DatabaseError::Connection(DbErr::Custom(
            "refused".to_string(),
        )));
        let (status, _) = get_response_body(error.into_response()).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_json_error_response_format() {
        let error = AppError::Forbidden("Staff role required".to_string());
        let (_, body) = get_response_body(error.into_response()).await;

        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.get("detail").unwrap(), "Staff role required");
    }

    #[test]
    fn test_classify_record_not_found() {
        let err = DatabaseError::classify("document", DbErr::RecordNotFound("id 7".to_string()));
        assert!(matches!(err, DatabaseError::NotFound { entity: "document", .. }));
    }

    #[test]
    fn test_classify_generic_query_error() {
        let err = DatabaseError::classify("document", DbErr::Custom("boom".to_string()));
        assert!(matches!(err, DatabaseError::Query { .. }));
    }

    #[test]
    fn test_error_display_impl() {
        assert_eq!(
            AppError::NotFound("test".to_string()).to_string(),
            "Not found: test"
        );
        assert_eq!(
            DatabaseError::not_found("case", 9).to_string(),
            "case not found: 9"
        );
    }
}
