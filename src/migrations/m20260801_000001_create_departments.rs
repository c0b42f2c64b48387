//! Migration: Create departments table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Departments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Departments::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Departments::Code).string().not_null())
                    .col(
                        ColumnDef::new(Departments::ParentDepartmentId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Departments::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Departments::DeletedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Departments::DeletedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Departments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Departments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_departments_parent")
                    .table(Departments::Table)
                    .col(Departments::ParentDepartmentId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Departments::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "departments"]
enum Departments {
    Table,
    Id,
    Name,
    Code,
    #[iden = "parent_department_id"]
    ParentDepartmentId,
    #[iden = "is_deleted"]
    IsDeleted,
    #[iden = "deleted_at"]
    DeletedAt,
    #[iden = "deleted_by"]
    DeletedBy,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
