//! Role-based authorization with type-safe extractors
//!
//! Usage in handlers:
//! ```ignore
//! use crate::middleware::{Authorized, roles::*};
//!
//! async fn delete_user(
//!     Authorized(admin, _): Authorized<AdminOnly>,
//!     Path(id): Path<i64>,
//! ) -> Result<()> {
//!     // Role already verified
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::application::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::user::{self, UserRole};

/// Trait for role gate marker types
pub trait RoleGate: Send + Sync + 'static {
    /// Human-readable requirement, used in 403 messages
    const DESCRIPTION: &'static str;

    fn allows(role: UserRole) -> bool;
}

/// Admins only
#[derive(Debug, Clone, Copy)]
pub struct AdminOnly;

impl RoleGate for AdminOnly {
    const DESCRIPTION: &'static str = "admin role";

    fn allows(role: UserRole) -> bool {
        role == UserRole::Admin
    }
}

/// Teachers and admins
#[derive(Debug, Clone, Copy)]
pub struct StaffOnly;

impl RoleGate for StaffOnly {
    const DESCRIPTION: &'static str = "staff role";

    fn allows(role: UserRole) -> bool {
        role.is_staff()
    }
}

/// Any authenticated role
#[derive(Debug, Clone, Copy)]
pub struct AnyRole;

impl RoleGate for AnyRole {
    const DESCRIPTION: &'static str = "any role";

    fn allows(_role: UserRole) -> bool {
        true
    }
}

/// Extractor that requires the authenticated user's role to pass the gate.
/// Fails with 403 Forbidden otherwise.
#[derive(Debug, Clone)]
pub struct Authorized<G: RoleGate>(pub user::Model, pub PhantomData<G>);

impl<G: RoleGate> Authorized<G> {
    /// Get the authenticated user
    pub fn user(&self) -> &user::Model {
        &self.0
    }

    /// Get the user ID
    pub fn user_id(&self) -> i64 {
        self.0.id
    }
}

impl<S, G> FromRequestParts<S> for Authorized<G>
where
    S: Send + Sync,
    G: RoleGate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        let auth_user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let role = auth_user
            .0
            .role()
            .ok_or_else(|| AppError::Forbidden("Unknown role".to_string()))?;

        if !G::allows(role) {
            return Err(AppError::Forbidden(format!(
                "Access denied: {} required",
                G::DESCRIPTION
            )));
        }

        Ok(Authorized(auth_user.0.clone(), PhantomData))
    }
}

/// Extractor for any authenticated user (no role requirement)
#[derive(Debug, Clone)]
pub struct Authenticated(pub user::Model);

impl Authenticated {
    /// Get the authenticated user
    pub fn user(&self) -> &user::Model {
        &self.0
    }

    /// Get the user ID
    pub fn user_id(&self) -> i64 {
        self.0.id
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        Ok(Authenticated(auth_user.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_gate() {
        assert!(AdminOnly::allows(UserRole::Admin));
        assert!(!AdminOnly::allows(UserRole::Teacher));
        assert!(!AdminOnly::allows(UserRole::Student));
    }

    #[test]
    fn test_staff_gate() {
        assert!(StaffOnly::allows(UserRole::Admin));
        assert!(StaffOnly::allows(UserRole::Teacher));
        assert!(!StaffOnly::allows(UserRole::Student));
    }

    #[test]
    fn test_any_role_gate() {
        assert!(AnyRole::allows(UserRole::Student));
    }
}
