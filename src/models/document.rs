use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Versioned file metadata. The binary payload lives outside this system;
/// `storage_path` is an opaque pointer into whatever store holds it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub document_number: String,
    pub title: String,
    pub category: String,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub version: i32,
    pub uploaded_by: i64,
    pub case_id: Option<i64>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::document_version::Entity")]
    Versions,
    #[sea_orm(has_many = "super::document_access_log::Entity")]
    AccessLogs,
}

impl Related<super::document_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Versions.def()
    }
}

impl Related<super::document_access_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// How a document was accessed, for the access log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    View,
    Download,
    Qr,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::View => "view",
            AccessType::Download => "download",
            AccessType::Qr => "qr",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view" => Some(AccessType::View),
            "download" => Some(AccessType::Download),
            "qr" => Some(AccessType::Qr),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccessType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
