use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Persisted refresh/verification tokens. Expired rows are physically
/// removed by the purge task; there is no soft delete here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auth_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTimeUtc,
    pub blacklisted: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Refresh,
    Verification,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Refresh => "refresh",
            TokenType::Verification => "verification",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
