use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only log of status transitions on a case. Rows are never updated
/// or deleted; every transition writes exactly one event.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "workflow_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub case_id: i64,
    pub status: String,
    pub changed_by: i64,
    pub note: Option<String>,
    #[schema(value_type = String)]
    pub changed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::case_record::Entity",
        from = "Column::CaseId",
        to = "super::case_record::Column::Id"
    )]
    Case,
}

impl Related<super::case_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Case.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
