use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rand::Rng;
use rsa::{
    pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding},
    RsaPrivateKey, RsaPublicKey,
};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::application::config::CONFIG;
use crate::application::error::{AppError, Result};
use crate::models::user::UserRole;

// In-memory key cache
static PRIVATE_KEY: Lazy<RwLock<Option<String>>> = Lazy::new(|| RwLock::new(None));
static PUBLIC_KEY: Lazy<RwLock<Option<String>>> = Lazy::new(|| RwLock::new(None));

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub iss: String, // Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64, // Expiration time
    pub iat: i64, // Issued at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>, // JWT ID for uniqueness
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>, // "refresh" for refresh tokens
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))
    }
}

/// Get the JWT private key (PEM format)
pub fn get_private_key() -> Result<String> {
    // Fast path: check cache with read lock
    {
        let cache = PRIVATE_KEY.read();
        if let Some(key) = cache.as_ref() {
            return Ok(key.clone());
        }
    }

    // Slow path: acquire write lock with double-checked locking
    let mut priv_cache = PRIVATE_KEY.write();

    // Double-check: another thread might have initialized while we waited
    if let Some(key) = priv_cache.as_ref() {
        return Ok(key.clone());
    }

    // Try to load from file
    if CONFIG.auth.jwt_private_key_path.exists() {
        let content = fs::read_to_string(&CONFIG.auth.jwt_private_key_path)
            .map_err(|e| AppError::Internal(format!("Failed to read private key: {}", e)))?;

        if !content.trim().is_empty() {
            *priv_cache = Some(content.clone());
            return Ok(content);
        }
    }

    // Generate in-memory key for development
    tracing::warn!("JWT private key not found, generating temporary key");
    let (private_pem, public_pem) = generate_rsa_key_pair()?;

    *priv_cache = Some(private_pem.clone());
    drop(priv_cache); // Release private key lock before acquiring public key lock

    {
        let mut pub_cache = PUBLIC_KEY.write();
        // Only set if not already set
        if pub_cache.is_none() {
            *pub_cache = Some(public_pem);
        }
    }

    Ok(private_pem)
}

/// Get the JWT public key (PEM format)
pub fn get_public_key() -> Result<String> {
    // Fast path: check cache with read lock
    {
        let cache = PUBLIC_KEY.read();
        if let Some(key) = cache.as_ref() {
            return Ok(key.clone());
        }
    }

    // Slow path: acquire write lock with double-checked locking
    let mut pub_cache = PUBLIC_KEY.write();

    // Double-check: another thread might have initialized while we waited
    if let Some(key) = pub_cache.as_ref() {
        return Ok(key.clone());
    }

    // Try to load from file
    if CONFIG.auth.jwt_public_key_path.exists() {
        let content = fs::read_to_string(&CONFIG.auth.jwt_public_key_path)
            .map_err(|e| AppError::Internal(format!("Failed to read public key: {}", e)))?;

        if !content.trim().is_empty() {
            *pub_cache = Some(content.clone());
            return Ok(content);
        }
    }

    // Release lock before calling get_private_key to avoid deadlock
    drop(pub_cache);

    // Trigger private key generation which also generates public key
    get_private_key()?;

    let cache = PUBLIC_KEY.read();
    cache
        .clone()
        .ok_or_else(|| AppError::Internal("Public key not available".to_string()))
}

/// Generate an RSA key pair for JWT signing
pub fn generate_rsa_key_pair() -> Result<(String, String)> {
    let mut rng = rand::thread_rng();

    let private_key = RsaPrivateKey::new(&mut rng, 2048)
        .map_err(|e| AppError::Internal(format!("Failed to generate RSA key: {}", e)))?;

    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| AppError::Internal(format!("Failed to serialize private key: {}", e)))?
        .to_string();

    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| AppError::Internal(format!("Failed to serialize public key: {}", e)))?;

    Ok((private_pem, public_pem))
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Create a JWT access token carrying the user's role
pub fn create_access_token(user_id: i64, email: &str, role: UserRole) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::seconds(CONFIG.auth.access_token_ttl);

    let claims = Claims {
        sub: user_id.to_string(),
        iss: CONFIG.auth.jwt_issuer.clone(),
        email: Some(email.to_string()),
        role: Some(role.as_str().to_string()),
        exp: exp.timestamp(),
        iat: now.timestamp(),
        jti: Some(uuid::Uuid::new_v4().to_string()),
        token_type: None,
    };

    let private_key = get_private_key()?;
    let encoding_key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid private key: {}", e)))?;

    let header = Header::new(jsonwebtoken::Algorithm::RS256);
    encode(&header, &claims, &encoding_key).map_err(|e| e.into())
}

/// Create a JWT refresh token (no role embedded - only for token refresh)
pub fn create_refresh_token(user_id: i64, email: &str) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::seconds(CONFIG.auth.refresh_token_ttl);

    let claims = Claims {
        sub: user_id.to_string(),
        iss: CONFIG.auth.jwt_issuer.clone(),
        email: Some(email.to_string()),
        role: None,
        exp: exp.timestamp(),
        iat: now.timestamp(),
        jti: Some(uuid::Uuid::new_v4().to_string()),
        token_type: Some("refresh".to_string()),
    };

    let private_key = get_private_key()?;
    let encoding_key = EncodingKey::from_rsa_pem(private_key.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid private key: {}", e)))?;

    let header = Header::new(jsonwebtoken::Algorithm::RS256);
    encode(&header, &claims, &encoding_key).map_err(|e| e.into())
}

/// Decode and validate a JWT token
pub fn decode_token(token: &str) -> Result<Claims> {
    let public_key = get_public_key()?;
    let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())
        .map_err(|e| AppError::Internal(format!("Invalid public key: {}", e)))?;

    let mut validation = Validation::new(jsonwebtoken::Algorithm::RS256);
    validation.validate_exp = true;
    validation.validate_aud = false;
    // No clock skew tolerance for expiration check
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok(token_data.claims)
}

/// Generate a cryptographically secure random string (hex)
pub fn generate_random_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..length).map(|_| rng.gen()).collect();
    hex::encode(bytes)
}

/// Generate a secure random password
pub fn generate_secure_password(length: usize) -> String {
    const CHARSET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_access_token_round_trip() {
        let token = create_access_token(7, "teacher@example.org", UserRole::Teacher).unwrap();
        let claims = decode_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.email.as_deref(), Some("teacher@example.org"));
        assert_eq!(claims.role.as_deref(), Some("teacher"));
        assert!(claims.token_type.is_none());
    }

    #[test]
    fn test_refresh_token_carries_marker_not_role() {
        let token = create_refresh_token(7, "teacher@example.org").unwrap();
        let claims = decode_token(&token).unwrap();
        assert_eq!(claims.token_type.as_deref(), Some("refresh"));
        assert!(claims.role.is_none());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(decode_token("not.a.jwt").is_err());
    }

    #[test]
    fn test_random_string_length_and_charset() {
        let s = generate_random_string(16);
        assert_eq!(s.len(), 32); // hex doubles the byte count
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
