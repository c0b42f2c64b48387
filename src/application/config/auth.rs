use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_private_key_path: PathBuf,
    pub jwt_public_key_path: PathBuf,
    pub jwt_issuer: String,
    /// Access-token lifetime in seconds.
    pub access_token_ttl: i64,
    /// Refresh-token lifetime in seconds.
    pub refresh_token_ttl: i64,
    /// Failed logins before the account locks.
    pub max_failed_logins: i32,
    /// Lockout window in minutes.
    pub lockout_minutes: i64,
    /// Bootstrap admin credentials for a fresh database.
    pub bootstrap_admin_email: String,
    pub bootstrap_admin_password: Option<String>,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_private_key_path: env::var("MEDCASE_JWT_PRIVATE_KEY")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/jwt_private.pem")),
            jwt_public_key_path: env::var("MEDCASE_JWT_PUBLIC_KEY")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/jwt_public.pem")),
            jwt_issuer: env::var("MEDCASE_JWT_ISSUER")
                .unwrap_or_else(|_| "medcase".to_string()),
            access_token_ttl: env::var("MEDCASE_ACCESS_TOKEN_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            refresh_token_ttl: env::var("MEDCASE_REFRESH_TOKEN_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(604800),
            max_failed_logins: 5,
            lockout_minutes: 30,
            bootstrap_admin_email: env::var("MEDCASE_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@medcase.local".to_string()),
            bootstrap_admin_password: env::var("MEDCASE_ADMIN_PASSWORD").ok(),
        }
    }
}
