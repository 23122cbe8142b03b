//! Password hashing and session tokens.
//!
//! - Passwords: argon2id PHC strings, salted per user.
//! - Sessions: HS256 JWT returned in the response body and in the
//!   `ldt_session` HttpOnly cookie.

use actix_web::cookie::{Cookie, SameSite};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::error::{AppError, AppResult};
use crate::models::SessionClaims;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "ldt_session";
/// Session JWT issuer.
pub const SESSION_ISSUER: &str = "linedefect";

/// Minimum accepted password length at sign-up.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password for storage.
pub fn hash_password(password: &str) -> AppResult<String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// A freshly issued session token.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Create a session token for `user_id`.
pub fn create_session_token(user_id: Uuid, settings: &SessionSettings) -> AppResult<IssuedSession> {
    let now = Utc::now();
    let expires_at = i64::try_from(settings.ttl_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Session lifetime of {}s is out of range",
                settings.ttl_secs
            ))
        })?;

    let claims = SessionClaims {
        sub: user_id.to_string(),
        iss: SESSION_ISSUER.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let key = EncodingKey::from_secret(settings.secret.expose_secret().as_bytes());
    let token = encode(&Header::default(), &claims, &key)
        .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))?;

    Ok(IssuedSession { token, expires_at })
}

/// Verify a session token and return the user id it was issued for.
pub fn verify_session_token(token: &str, secret: &SecretString) -> Result<Uuid, String> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_aud = false;

    let token_data = decode::<SessionClaims>(token, &key, &validation)
        .map_err(|e| format!("Invalid session token: {}", e))?;

    Uuid::parse_str(&token_data.claims.sub).map_err(|e| format!("Invalid session subject: {}", e))
}

/// Build the session cookie. An empty token clears it.
pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(secure);
    if token.is_empty() {
        cookie.make_removal();
    }
    cookie
}
