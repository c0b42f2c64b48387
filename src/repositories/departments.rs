//! Department persistence. Staff/student counts are derived from users.

use sea_orm::{ColumnTrait, Condition, DbConn};

use crate::application::error::DatabaseError;
use crate::models::prelude::*;
use crate::models::user::UserRole;
use crate::repositories::base::{Page, Repository, SoftDelete};

#[derive(Clone)]
pub struct DepartmentRepository {
    base: Repository<Department>,
    users: Repository<User>,
}

impl DepartmentRepository {
    pub fn new(db: DbConn) -> Self {
        DepartmentRepository {
            users: Repository::new(db.clone(), "user"),
            base: Repository::new(db, "department"),
        }
    }

    pub async fn create(
        &self,
        model: department::ActiveModel,
    ) -> Result<department::Model, DatabaseError> {
        self.base.create(model).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<department::Model, DatabaseError> {
        self.base
            .try_find_one(Department::not_deleted().add(department::Column::Id.eq(id)))
            .await?
            .ok_or_else(|| DatabaseError::not_found("department", id))
    }

    pub async fn try_find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<department::Model>, DatabaseError> {
        self.base
            .try_find_one(Department::not_deleted().add(department::Column::Id.eq(id)))
            .await
    }

    pub async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<department::Model>, DatabaseError> {
        self.base
            .try_find_one(Department::not_deleted().add(department::Column::Code.eq(code)))
            .await
    }

    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<department::Model>, DatabaseError> {
        self.base
            .try_find_one(Department::not_deleted().add(department::Column::Name.eq(name)))
            .await
    }

    pub async fn find_all(&self) -> Result<Vec<department::Model>, DatabaseError> {
        self.base.find_many(Department::not_deleted()).await
    }

    pub async fn paginate(
        &self,
        cond: Condition,
        page: u64,
        per_page: u64,
    ) -> Result<Page<department::Model>, DatabaseError> {
        self.base
            .paginate(Department::not_deleted().add(cond), page, per_page)
            .await
    }

    pub async fn update(
        &self,
        id: i64,
        model: department::ActiveModel,
    ) -> Result<department::Model, DatabaseError> {
        self.base.update_by_id(id, model).await
    }

    /// Direct child departments.
    pub async fn children(
        &self,
        department_id: i64,
    ) -> Result<Vec<department::Model>, DatabaseError> {
        self.base
            .find_many(
                Department::not_deleted()
                    .add(department::Column::ParentDepartmentId.eq(department_id)),
            )
            .await
    }

    pub async fn staff_count(&self, department_id: i64) -> Result<u64, DatabaseError> {
        self.users
            .count(
                User::not_deleted()
                    .add(user::Column::DepartmentId.eq(department_id))
                    .add(
                        Condition::any()
                            .add(user::Column::Role.eq(UserRole::Teacher.as_str()))
                            .add(user::Column::Role.eq(UserRole::Admin.as_str())),
                    ),
            )
            .await
    }

    pub async fn student_count(&self, department_id: i64) -> Result<u64, DatabaseError> {
        self.users
            .count(
                User::not_deleted()
                    .add(user::Column::DepartmentId.eq(department_id))
                    .add(user::Column::Role.eq(UserRole::Student.as_str())),
            )
            .await
    }

    pub async fn count(&self, cond: Condition) -> Result<u64, DatabaseError> {
        self.base.count(Department::not_deleted().add(cond)).await
    }

    pub async fn soft_delete(
        &self,
        department_id: i64,
        deleted_by: Option<i64>,
    ) -> Result<(), DatabaseError> {
        self.base.delete_by_id(department_id, deleted_by).await
    }
}
