//! Migration: Create activity_logs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ActivityLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ActivityLogs::UserId).big_integer().null())
                    .col(ColumnDef::new(ActivityLogs::UserEmail).string().null())
                    .col(ColumnDef::new(ActivityLogs::Action).string().not_null())
                    .col(ColumnDef::new(ActivityLogs::EntityType).string().not_null())
                    .col(ColumnDef::new(ActivityLogs::EntityId).string().null())
                    .col(ColumnDef::new(ActivityLogs::Details).text().null())
                    .col(ColumnDef::new(ActivityLogs::IpAddress).string().null())
                    .col(ColumnDef::new(ActivityLogs::UserAgent).string().null())
                    .col(
                        ColumnDef::new(ActivityLogs::Success)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(ActivityLogs::ErrorMessage).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_logs_timestamp")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::Timestamp)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_logs_user_id")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_logs_action")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::Action)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_logs_entity_type")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::EntityType)
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
                    .table(ActivityLogs::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "activity_logs"]
enum ActivityLogs {
    Table,
    Id,
    Timestamp,
    #[iden = "user_id"]
    UserId,
    #[iden = "user_email"]
    UserEmail,
    Action,
    #[iden = "entity_type"]
    EntityType,
    #[iden = "entity_id"]
    EntityId,
    Details,
    #[iden = "ip_address"]
    IpAddress,
    #[iden = "user_agent"]
    UserAgent,
    Success,
    #[iden = "error_message"]
    ErrorMessage,
}
