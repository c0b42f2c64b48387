//! Migration: Create case_comments table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CaseComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CaseComments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CaseComments::CaseId).big_integer().not_null())
                    .col(ColumnDef::new(CaseComments::AuthorId).big_integer().not_null())
                    .col(ColumnDef::new(CaseComments::Body).text().not_null())
                    .col(
                        ColumnDef::new(CaseComments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_case_comments_case")
                            .from(CaseComments::Table, CaseComments::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_case_comments_case")
                    .table(CaseComments::Table)
                    .col(CaseComments::CaseId)
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
                    .table(CaseComments::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "case_comments"]
enum CaseComments {
    Table,
    Id,
    #[iden = "case_id"]
    CaseId,
    #[iden = "author_id"]
    AuthorId,
    Body,
    #[iden = "created_at"]
    CreatedAt,
}

#[derive(Iden)]
#[iden = "cases"]
enum Cases {
    Table,
    Id,
}
