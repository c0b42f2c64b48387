//! Document metadata persistence, version rollover and access logging.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::application::error::DatabaseError;
use crate::models::document::AccessType;
use crate::models::prelude::*;
use crate::repositories::base::{Page, Repository, SoftDelete};

/// `DOC-YYYYMM-XXXX`.
pub fn is_document_number(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("DOC-") else {
        return false;
    };
    let mut parts = rest.splitn(2, '-');
    let (Some(period), Some(serial)) = (parts.next(), parts.next()) else {
        return false;
    };
    period.len() == 6
        && serial.len() == 4
        && period.chars().all(|c| c.is_ascii_digit())
        && serial.chars().all(|c| c.is_ascii_digit())
}

/// Replacement file metadata for a version rollover.
#[derive(Debug, Clone)]
pub struct NewFileMetadata {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
}

#[derive(Clone)]
pub struct DocumentRepository {
    base: Repository<Document>,
}

impl DocumentRepository {
    pub fn new(db: DbConn) -> Self {
        DocumentRepository {
            base: Repository::new(db, "document"),
        }
    }

    fn db(&self) -> &DbConn {
        self.base.db()
    }

    pub async fn create(
        &self,
        model: document::ActiveModel,
    ) -> Result<document::Model, DatabaseError> {
        self.base.create(model).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<document::Model, DatabaseError> {
        self.base
            .try_find_one(Document::not_deleted().add(document::Column::Id.eq(id)))
            .await?
            .ok_or_else(|| DatabaseError::not_found("document", id))
    }

    pub async fn find_by_number(
        &self,
        document_number: &str,
    ) -> Result<Option<document::Model>, DatabaseError> {
        self.base
            .try_find_one(
                Document::not_deleted()
                    .add(document::Column::DocumentNumber.eq(document_number)),
            )
            .await
    }

    pub async fn find_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<document::Model>, DatabaseError> {
        self.base
            .find_many(Document::not_deleted().add(document::Column::Category.eq(category)))
            .await
    }

    pub async fn paginate(
        &self,
        cond: Condition,
        page: u64,
        per_page: u64,
    ) -> Result<Page<document::Model>, DatabaseError> {
        self.base
            .paginate(Document::not_deleted().add(cond), page, per_page)
            .await
    }

    pub async fn count(&self, cond: Condition) -> Result<u64, DatabaseError> {
        self.base.count(Document::not_deleted().add(cond)).await
    }

    pub async fn update(
        &self,
        id: i64,
        model: document::ActiveModel,
    ) -> Result<document::Model, DatabaseError> {
        self.base.update_by_id(id, model).await
    }

    /// Archive the current file metadata into `document_versions`, bump the
    /// version counter and swap in the replacement file, all in one
    /// transaction.
    pub async fn add_version(
        &self,
        document_id: i64,
        replacement: NewFileMetadata,
        archived_by: i64,
    ) -> Result<document::Model, DatabaseError> {
        let document = self.find_by_id(document_id).await?;

        let txn = self
            .db()
            .begin()
            .await
            .map_err(|e| DatabaseError::in_transaction("document", e))?;

        let now = Utc::now();
        document_version::ActiveModel {
            document_id: Set(document.id),
            version: Set(document.version),
            file_name: Set(document.file_name.clone()),
            mime_type: Set(document.mime_type.clone()),
            size_bytes: Set(document.size_bytes),
            storage_path: Set(document.storage_path.clone()),
            archived_by: Set(archived_by),
            archived_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| DatabaseError::in_transaction("document_version", e))?;

        let next_version = document.version + 1;
        let mut active: document::ActiveModel = document.into();
        active.version = Set(next_version);
        active.file_name = Set(replacement.file_name);
        active.mime_type = Set(replacement.mime_type);
        active.size_bytes = Set(replacement.size_bytes);
        active.storage_path = Set(replacement.storage_path);
        active.updated_at = Set(now);
        let document = active
            .update(&txn)
            .await
            .map_err(|e| DatabaseError::in_transaction("document", e))?;

        txn.commit()
            .await
            .map_err(|e| DatabaseError::in_transaction("document", e))?;

        Ok(document)
    }

    /// Archived versions, newest first.
    pub async fn versions(
        &self,
        document_id: i64,
    ) -> Result<Vec<document_version::Model>, DatabaseError> {
        DocumentVersion::find()
            .filter(document_version::Column::DocumentId.eq(document_id))
            .order_by_desc(document_version::Column::Version)
            .all(self.db())
            .await
            .map_err(|e| DatabaseError::classify("document_version", e))
    }

    pub async fn log_access(
        &self,
        document_id: i64,
        user_id: Option<i64>,
        access_type: AccessType,
    ) -> Result<document_access_log::Model, DatabaseError> {
        document_access_log::ActiveModel {
            document_id: Set(document_id),
            user_id: Set(user_id),
            access_type: Set(access_type.as_str().to_string()),
            accessed_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .map_err(|e| DatabaseError::classify("document_access_log", e))
    }

    pub async fn access_count(&self, document_id: i64) -> Result<u64, DatabaseError> {
        use sea_orm::PaginatorTrait;
        DocumentAccessLog::find()
            .filter(document_access_log::Column::DocumentId.eq(document_id))
            .count(self.db())
            .await
            .map_err(|e| DatabaseError::classify("document_access_log", e))
    }

    /// Exact document-number lookup when the query is shaped like one,
    /// otherwise a LIKE union over title and file name.
    pub async fn search(&self, query: &str) -> Result<Vec<document::Model>, DatabaseError> {
        if is_document_number(query) {
            return Ok(self.find_by_number(query).await?.into_iter().collect());
        }

        let pattern = format!("%{}%", query);
        self.base
            .find_many(
                Document::not_deleted().add(
                    Condition::any()
                        .add(document::Column::Title.like(&pattern))
                        .add(document::Column::FileName.like(&pattern)),
                ),
            )
            .await
    }

    /// Next `DOC-YYYYMM-XXXX` serial for the current month.
    pub async fn next_document_number(&self) -> Result<String, DatabaseError> {
        let prefix = format!("DOC-{}-", Utc::now().format("%Y%m"));
        let taken = self
            .base
            .count(Condition::all().add(document::Column::DocumentNumber.starts_with(&prefix)))
            .await?;
        Ok(format!("{}{:04}", prefix, taken + 1))
    }

    pub async fn soft_delete(
        &self,
        document_id: i64,
        deleted_by: Option<i64>,
    ) -> Result<(), DatabaseError> {
        self.base.delete_by_id(document_id, deleted_by).await
    }
}
