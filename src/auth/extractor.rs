//! Actix-web extractor for session authentication.
//!
//! # Security
//! - The session secret is held in `SecretString` and never logged
//! - Role and zone are loaded from the users table on every request, so a
//!   token never grants more than the account currently has

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::{Principal, User};
use crate::services::session::{SESSION_COOKIE, verify_session_token};

/// Pull the session token from `Authorization: Bearer` or the session cookie.
pub fn extract_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        req.cookie(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Extractor that requires a valid session.
///
/// ```ignore
/// async fn handler(auth: SessionAuth) -> impl Responder {
///     // auth.principal is the caller, auth.user the full account row
/// }
/// ```
pub struct SessionAuth {
    pub principal: Principal,
    pub user: User,
}

impl FromRequest for SessionAuth {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let config = req.app_data::<web::Data<Config>>().cloned();
        let token = extract_token(req);

        Box::pin(async move {
            let token = token.ok_or_else(|| {
                AppError::Unauthorized(
                    "Missing session. Sign in or provide a Bearer token.".to_string(),
                )
            })?;

            let config = config.ok_or_else(|| {
                AppError::Database("Internal configuration error".to_string())
            })?;

            let user_id = verify_session_token(&token, &config.session.secret).map_err(|e| {
                debug!("Rejected session token: {}", e);
                AppError::Unauthorized("Invalid or expired session".to_string())
            })?;

            let pool = pool.ok_or_else(|| {
                AppError::Database("Internal configuration error".to_string())
            })?;

            let user = pool
                .find_user_by_id(user_id)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

            Ok(SessionAuth {
                principal: user.principal(),
                user,
            })
        })
    }
}
