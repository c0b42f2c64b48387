pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_departments;
mod m20260801_000002_create_users;
mod m20260801_000003_create_profiles;
mod m20260801_000004_create_cases;
mod m20260801_000005_create_workflow_events;
mod m20260801_000006_create_case_comments;
mod m20260801_000007_create_documents;
mod m20260801_000008_create_document_versions;
mod m20260801_000009_create_document_access_logs;
mod m20260801_000010_create_notifications;
mod m20260801_000011_create_auth_tokens;
mod m20260801_000012_create_activity_logs;
mod m20260801_000013_create_qr_codes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_departments::Migration),
            Box::new(m20260801_000002_create_users::Migration),
            Box::new(m20260801_000003_create_profiles::Migration),
            Box::new(m20260801_000004_create_cases::Migration),
            Box::new(m20260801_000005_create_workflow_events::Migration),
            Box::new(m20260801_000006_create_case_comments::Migration),
            Box::new(m20260801_000007_create_documents::Migration),
            Box::new(m20260801_000008_create_document_versions::Migration),
            Box::new(m20260801_000009_create_document_access_logs::Migration),
            Box::new(m20260801_000010_create_notifications::Migration),
            Box::new(m20260801_000011_create_auth_tokens::Migration),
            Box::new(m20260801_000012_create_activity_logs::Migration),
            Box::new(m20260801_000013_create_qr_codes::Migration),
        ]
    }
}
