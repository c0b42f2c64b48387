//! Migration: Create qr_codes table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(QrCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QrCodes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(QrCodes::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(QrCodes::ResourceType).string().not_null())
                    .col(ColumnDef::new(QrCodes::ResourceId).big_integer().not_null())
                    .col(ColumnDef::new(QrCodes::CreatedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(QrCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_qr_codes_code")
                    .table(QrCodes::Table)
                    .col(QrCodes::Code)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_qr_codes_resource")
                    .table(QrCodes::Table)
                    .col(QrCodes::ResourceType)
                    .col(QrCodes::ResourceId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QrCodes::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "qr_codes"]
enum QrCodes {
    Table,
    Id,
    Code,
    #[iden = "resource_type"]
    ResourceType,
    #[iden = "resource_id"]
    ResourceId,
    #[iden = "created_by"]
    CreatedBy,
    #[iden = "created_at"]
    CreatedAt,
}
