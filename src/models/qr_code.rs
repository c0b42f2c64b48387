use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Short code mapped to a document or case for link-based retrieval.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "qr_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub resource_type: String,
    pub resource_id: i64,
    pub created_by: i64,
    #[schema(value_type = String)]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Resource kinds a QR code may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrResourceType {
    Document,
    Case,
}

impl QrResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QrResourceType::Document => "document",
            QrResourceType::Case => "case",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "document" => Some(QrResourceType::Document),
            "case" => Some(QrResourceType::Case),
            _ => None,
        }
    }
}

impl std::fmt::Display for QrResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
