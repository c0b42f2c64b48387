//! Migration: Create document_access_logs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocumentAccessLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentAccessLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentAccessLogs::DocumentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocumentAccessLogs::UserId).big_integer().null())
                    .col(
                        ColumnDef::new(DocumentAccessLogs::AccessType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentAccessLogs::AccessedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_document_access_logs_document")
                            .from(DocumentAccessLogs::Table, DocumentAccessLogs::DocumentId)
                            .to(Documents::Table, Documents::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_document_access_logs_document")
                    .table(DocumentAccessLogs::Table)
                    .col(DocumentAccessLogs::DocumentId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_document_access_logs_accessed_at")
                    .table(DocumentAccessLogs::Table)
                    .col(DocumentAccessLogs::AccessedAt)
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
                    .table(DocumentAccessLogs::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "document_access_logs"]
enum DocumentAccessLogs {
    Table,
    Id,
    #[iden = "document_id"]
    DocumentId,
    #[iden = "user_id"]
    UserId,
    #[iden = "access_type"]
    AccessType,
    #[iden = "accessed_at"]
    AccessedAt,
}

#[derive(Iden)]
#[iden = "documents"]
enum Documents {
    Table,
    Id,
}
