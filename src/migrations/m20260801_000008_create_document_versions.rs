//! Migration: Create document_versions table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocumentVersions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentVersions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentVersions::DocumentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocumentVersions::Version).integer().not_null())
                    .col(ColumnDef::new(DocumentVersions::FileName).string().not_null())
                    .col(ColumnDef::new(DocumentVersions::MimeType).string().not_null())
                    .col(
                        ColumnDef::new(DocumentVersions::SizeBytes)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentVersions::StoragePath)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentVersions::ArchivedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentVersions::ArchivedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_versions_document")
                            .from(DocumentVersions::Table, DocumentVersions::DocumentId)
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_document_versions_document")
                    .table(DocumentVersions::Table)
                    .col(DocumentVersions::DocumentId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(DocumentVersions::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "document_versions"]
enum DocumentVersions {
    Table,
    Id,
    #[iden = "document_id"]
    DocumentId,
    Version,
    #[iden = "file_name"]
    FileName,
    #[iden = "mime_type"]
    MimeType,
    #[iden = "size_bytes"]
    SizeBytes,
    #[iden = "storage_path"]
    StoragePath,
    #[iden = "archived_by"]
    ArchivedBy,
    #[iden = "archived_at"]
    ArchivedAt,
}

#[derive(Iden)]
#[iden = "documents"]
enum Documents {
    Table,
    Id,
}
