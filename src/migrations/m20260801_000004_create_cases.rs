//! Migration: Create cases table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cases::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Cases::CaseNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Cases::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Cases::AssignedStaffId).big_integer().null())
                    .col(ColumnDef::new(Cases::Title).string().not_null())
                    .col(ColumnDef::new(Cases::PatientInfo).text().null())
                    .col(ColumnDef::new(Cases::MedicationHistory).text().null())
                    .col(ColumnDef::new(Cases::LabValues).text().null())
                    .col(ColumnDef::new(Cases::Assessment).text().null())
                    .col(ColumnDef::new(Cases::Plan).text().null())
                    .col(
                        ColumnDef::new(Cases::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Cases::EvaluationScore).integer().null())
                    .col(ColumnDef::new(Cases::EvaluationFeedback).text().null())
                    .col(
                        ColumnDef::new(Cases::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Cases::DeletedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Cases::DeletedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Cases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cases_student")
                            .from(Cases::Table, Cases::StudentId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_case_number")
                    .table(Cases::Table)
                    .col(Cases::CaseNumber)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_student")
                    .table(Cases::Table)
                    .col(Cases::StudentId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_assigned_staff")
                    .table(Cases::Table)
                    .col(Cases::AssignedStaffId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_status")
                    .table(Cases::Table)
                    .col(Cases::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cases::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
#[iden = "cases"]
enum Cases {
    Table,
    Id,
    #[iden = "case_number"]
    CaseNumber,
    #[iden = "student_id"]
    StudentId,
    #[iden = "assigned_staff_id"]
    AssignedStaffId,
    Title,
    #[iden = "patient_info"]
    PatientInfo,
    #[iden = "medication_history"]
    MedicationHistory,
    #[iden = "lab_values"]
    LabValues,
    Assessment,
    Plan,
    Status,
    #[iden = "evaluation_score"]
    EvaluationScore,
    #[iden = "evaluation_feedback"]
    EvaluationFeedback,
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

#[derive(Iden)]
#[iden = "users"]
enum Users {
    Table,
    Id,
}
