pub mod activity;
pub mod bootstrap;
pub mod dashboard;
pub mod notify;
pub mod security;

pub use activity::ActivityService;
pub use notify::NotifyService;
