pub mod auth;
pub mod roles;

pub use auth::{require_auth, AuthenticatedUser};
pub use roles::{AdminOnly, AnyRole, Authenticated, Authorized, RoleGate, StaffOnly};
