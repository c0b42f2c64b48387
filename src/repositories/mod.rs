pub mod base;
pub mod cases;
pub mod departments;
pub mod documents;
pub mod notifications;
pub mod qrcodes;
pub mod tokens;
pub mod users;

pub use base::{Page, Repository, SoftDelete};
pub use cases::CaseRepository;
pub use departments::DepartmentRepository;
pub use documents::DocumentRepository;
pub use notifications::NotificationRepository;
pub use qrcodes::QrCodeRepository;
pub use tokens::TokenRepository;
pub use users::UserRepository;

use crate::models::prelude::*;

impl SoftDelete for User {
    fn is_deleted_column() -> Self::Column {
        crate::models::user::Column::IsDeleted
    }
    fn deleted_at_column() -> Self::Column {
        crate::models::user::Column::DeletedAt
    }
    fn deleted_by_column() -> Self::Column {
        crate::models::user::Column::DeletedBy
    }
}

impl SoftDelete for Case {
    fn is_deleted_column() -> Self::Column {
        crate::models::case_record::Column::IsDeleted
    }
    fn deleted_at_column() -> Self::Column {
        crate::models::case_record::Column::DeletedAt
    }
    fn deleted_by_column() -> Self::Column {
        crate::models::case_record::Column::DeletedBy
    }
}

impl SoftDelete for Document {
    fn is_deleted_column() -> Self::Column {
        crate::models::document::Column::IsDeleted
    }
    fn deleted_at_column() -> Self::Column {
        crate::models::document::Column::DeletedAt
    }
    fn deleted_by_column() -> Self::Column {
        crate::models::document::Column::DeletedBy
    }
}

impl SoftDelete for Department {
    fn is_deleted_column() -> Self::Column {
        crate::models::department::Column::IsDeleted
    }
    fn deleted_at_column() -> Self::Column {
        crate::models::department::Column::DeletedAt
    }
    fn deleted_by_column() -> Self::Column {
        crate::models::department::Column::DeletedBy
    }
}
