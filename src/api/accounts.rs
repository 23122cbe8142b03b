//! Account endpoints: sign-up, sign-in, current user, logout.

use actix_web::{HttpResponse, get, post, web};
use tracing::{info, warn};

use crate::auth::SessionAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{RoleAssignment, SessionResponse, SignInRequest, SignUpRequest, User, UserResponse};
use crate::services::lifecycle::{self, limits};
use crate::services::session::{create_session_token, hash_password, session_cookie, verify_password};

/// Configure account routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(sign_up)
        .service(sign_in)
        .service(get_current_user)
        .service(logout);
}

/// Create an account and start a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    tag = "Auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/sign-up")]
pub async fn sign_up(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<SignUpRequest>,
) -> AppResult<HttpResponse> {
    let request = body.into_inner();

    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput("a valid email is required".to_string()));
    }
    lifecycle::check_length("email", email, limits::EMAIL)?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("name is required".to_string()));
    }
    lifecycle::check_length("name", name, limits::USER_NAME)?;
    let assignment =
        RoleAssignment::from_parts(request.role, request.zone).map_err(AppError::InvalidInput)?;

    let password_hash = hash_password(&request.password)?;
    let user = pool
        .insert_user(email, name, assignment, password_hash)
        .await?;

    info!(
        user_id = %user.id,
        role = %assignment.role(),
        zone = ?assignment.zone(),
        "Account created"
    );

    session_response(user, &config, HttpResponse::Created())
}

/// Sign in with email and password.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    tag = "Auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    body: web::Json<SignInRequest>,
) -> AppResult<HttpResponse> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = pool.find_user_by_email(&body.email).await?.ok_or_else(|| {
        warn!("Sign-in for unknown email");
        invalid()
    })?;

    if !verify_password(&body.password, &user.password_hash) {
        warn!(user_id = %user.id, "Sign-in with wrong password");
        return Err(invalid());
    }

    info!(user_id = %user.id, "Signed in");
    session_response(user, &config, HttpResponse::Ok())
}

/// Current user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse)
    ),
    security(("session" = []))
)]
#[get("/auth/me")]
pub async fn get_current_user(auth: SessionAuth) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse::from(auth.user)))
}

/// Clear the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out")
    )
)]
#[post("/auth/logout")]
pub async fn logout(config: web::Data<Config>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok()
        .cookie(session_cookie("", config.environment.is_production()))
        .json(serde_json::json!({ "message": "Logged out" })))
}

fn session_response(
    user: User,
    config: &Config,
    mut builder: actix_web::HttpResponseBuilder,
) -> AppResult<HttpResponse> {
    let issued = create_session_token(user.id, &config.session)?;
    let cookie = session_cookie(&issued.token, config.environment.is_production());

    Ok(builder.cookie(cookie).json(SessionResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: user.into(),
    }))
}
