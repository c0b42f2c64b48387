//! Migration: Create documents table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Documents::DocumentNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Documents::Title).string().not_null())
                    .col(ColumnDef::new(Documents::Category).string().not_null())
                    .col(ColumnDef::new(Documents::FileName).string().not_null())
                    .col(ColumnDef::new(Documents::MimeType).string().not_null())
                    .col(ColumnDef::new(Documents::SizeBytes).big_integer().not_null())
                    .col(ColumnDef::new(Documents::StoragePath).string().not_null())
                    .col(
                        ColumnDef::new(Documents::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Documents::UploadedBy).big_integer().not_null())
                    .col(ColumnDef::new(Documents::CaseId).big_integer().null())
                    .col(
                        ColumnDef::new(Documents::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Documents::DeletedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Documents::DeletedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_documents_number")
                    .table(Documents::Table)
                    .col(Documents::DocumentNumber)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_documents_category")
                    .table(Documents::Table)
                    .col(Documents::Category)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "documents"]
enum Documents {
    Table,
    Id,
    #[iden = "document_number"]
    DocumentNumber,
    Title,
    Category,
    #[iden = "file_name"]
    FileName,
    #[iden = "mime_type"]
    MimeType,
    #[iden = "size_bytes"]
    SizeBytes,
    #[iden = "storage_path"]
    StoragePath,
    Version,
    #[iden = "uploaded_by"]
    UploadedBy,
    #[iden = "case_id"]
    CaseId,
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
