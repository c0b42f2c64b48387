use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hierarchical department; `parent_department_id` points at the parent
/// node, NULL for top-level departments.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub code: String,
    pub parent_department_id: Option<i64>,
    pub is_deleted: bool,
    #[schema(value_type = Option<String>)]
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
    #[schema(value_type = String)]
    pub created_at: DateTimeUtc,
    #[schema(value_type = String)]
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
