pub mod activity_log;
pub mod auth_token;
pub mod case_comment;
pub mod case_record;
pub mod department;
pub mod document;
pub mod document_access_log;
pub mod document_version;
pub mod notification;
pub mod profile;
pub mod qr_code;
pub mod user;
pub mod workflow_event;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::activity_log::{self, Entity as ActivityLog};
    pub use super::auth_token::{self, Entity as AuthToken};
    pub use super::case_comment::{self, Entity as CaseComment};
    pub use super::case_record::{self, Entity as Case};
    pub use super::department::{self, Entity as Department};
    pub use super::document::{self, Entity as Document};
    pub use super::document_access_log::{self, Entity as DocumentAccessLog};
    pub use super::document_version::{self, Entity as DocumentVersion};
    pub use super::notification::{self, Entity as Notification};
    pub use super::profile::{self, Entity as Profile};
    pub use super::qr_code::{self, Entity as QrCode};
    pub use super::user::{self, Entity as User};
    pub use super::workflow_event::{self, Entity as WorkflowEvent};
}
