use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: String,
    pub status: String,
    pub failed_login_count: i32,
    pub locked_until: Option<DateTimeUtc>,
    pub department_id: Option<i64>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::profile::Entity")]
    Profile,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// User roles. Stored as plain strings in the `role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Teacher => "teacher",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(UserRole::Student),
            "teacher" => Some(UserRole::Teacher),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Teachers and admins count as staff.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Teacher | UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status values for the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Model {
    pub fn role(&self) -> Option<UserRole> {
        UserRole::parse(&self.role)
    }

    pub fn is_locked(&self, now: DateTimeUtc) -> bool {
        self.locked_until.map(|until| until > now).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Student, UserRole::Teacher, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("superuser"), None);
    }

    #[test]
    fn test_staff_roles() {
        assert!(!UserRole::Student.is_staff());
        assert!(UserRole::Teacher.is_staff());
        assert!(UserRole::Admin.is_staff());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = Model {
            id: 1,
            email: "student@example.org".to_string(),
            hashed_password: "$2b$12$secret".to_string(),
            role: "student".to_string(),
            status: "active".to_string(),
            failed_login_count: 0,
            locked_until: None,
            department_id: None,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_lockout_window() {
        let now = chrono::Utc::now();
        let user = Model {
            id: 1,
            email: "s@example.org".to_string(),
            hashed_password: String::new(),
            role: "student".to_string(),
            status: "active".to_string(),
            failed_login_count: 5,
            locked_until: Some(now + chrono::Duration::minutes(30)),
            department_id: None,
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            created_at: now,
            updated_at: now,
        };
        assert!(user.is_locked(now));
        assert!(!user.is_locked(now + chrono::Duration::minutes(31)));
    }
}
