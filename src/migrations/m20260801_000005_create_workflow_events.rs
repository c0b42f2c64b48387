//! Migration: Create workflow_events table (append-only case status history)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkflowEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkflowEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WorkflowEvents::CaseId).big_integer().not_null())
                    .col(ColumnDef::new(WorkflowEvents::Status).string().not_null())
                    .col(ColumnDef::new(WorkflowEvents::ChangedBy).big_integer().not_null())
                    .col(ColumnDef::new(WorkflowEvents::Note).string().null())
                    .col(
                        ColumnDef::new(WorkflowEvents::ChangedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workflow_events_case")
                            .from(WorkflowEvents::Table, WorkflowEvents::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_workflow_events_case")
                    .table(WorkflowEvents::Table)
                    .col(WorkflowEvents::CaseId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_workflow_events_changed_at")
                    .table(WorkflowEvents::Table)
                    .col(WorkflowEvents::ChangedAt)
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
                    .table(WorkflowEvents::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "workflow_events"]
enum WorkflowEvents {
    Table,
    Id,
    #[iden = "case_id"]
    CaseId,
    Status,
    #[iden = "changed_by"]
    ChangedBy,
    Note,
    #[iden = "changed_at"]
    ChangedAt,
}

#[derive(Iden)]
#[iden = "cases"]
enum Cases {
    Table,
    Id,
}
