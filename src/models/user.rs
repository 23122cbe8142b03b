//! User account models and session DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Principal, Role, RoleAssignment, Zone};

/// User stored in database.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub assignment: RoleAssignment,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal::new(self.id, self.name.clone(), self.assignment)
    }
}

/// Account creation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    /// Required for group leaders, rejected for other roles.
    #[serde(default)]
    pub zone: Option<Zone>,
}

/// Email/password login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user (returned by /auth/me and on login).
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub role_label: String,
    pub zone: Option<Zone>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        let role = u.assignment.role();
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role,
            role_label: role.label().to_string(),
            zone: u.assignment.zone(),
        }
    }
}

/// Response for sign-up and sign-in.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

/// Session JWT claims.
///
/// Role and zone are not carried in the token; they are re-read from the
/// users table on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iss: String,
    pub exp: usize,
    pub iat: usize,
}
