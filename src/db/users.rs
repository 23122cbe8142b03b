//! Database operations for user accounts.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::user::{self, ActiveModel, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::{Role, RoleAssignment, User, Zone};

use super::{DbPool, is_unique_violation};

impl DbPool {
    /// Insert a new account. Emails are stored lower-cased.
    pub async fn insert_user(
        &self,
        email: &str,
        name: &str,
        assignment: RoleAssignment,
        password_hash: String,
    ) -> AppResult<User> {
        let now = Utc::now();
        let email = email.trim().to_lowercase();

        let model = ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(email.clone()),
            name: Set(name.trim().to_string()),
            role: Set(assignment.role().as_str().to_string()),
            zone: Set(assignment.zone().map(|z| z.as_str().to_string())),
            password_hash: Set(password_hash),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(self.connection()).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("An account for {} already exists", email))
            } else {
                AppError::Database(format!("Failed to insert user: {}", e))
            }
        })?;

        model_to_user(inserted)
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?;

        result.map(model_to_user).transpose()
    }

    /// Find a user by ID.
    pub async fn find_user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get user: {}", e)))?;

        result.map(model_to_user).transpose()
    }
}

fn model_to_user(m: user::Model) -> AppResult<User> {
    let role = Role::parse(&m.role)
        .ok_or_else(|| AppError::Database(format!("Unknown role '{}' for user {}", m.role, m.id)))?;
    let zone = match m.zone.as_deref() {
        Some(code) => Some(Zone::parse(code).ok_or_else(|| {
            AppError::Database(format!("Unknown zone '{}' for user {}", code, m.id))
        })?),
        None => None,
    };
    let assignment = RoleAssignment::from_parts(role, zone)
        .map_err(|e| AppError::Database(format!("Invalid account {}: {}", m.id, e)))?;

    Ok(User {
        id: m.id,
        email: m.email,
        name: m.name,
        assignment,
        password_hash: m.password_hash,
        created_at: m.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(role: &str, zone: Option<&str>) -> user::Model {
        let now = Utc::now();
        user::Model {
            id: Uuid::now_v7(),
            email: "gl@plant.example".to_string(),
            name: "Asha".to_string(),
            role: role.to_string(),
            zone: zone.map(String::from),
            password_hash: "$argon2id$...".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_model_to_user() {
        let user = model_to_user(model("group_leader", Some("R3"))).unwrap();
        assert_eq!(user.assignment, RoleAssignment::GroupLeader { zone: Zone::R3 });

        assert!(model_to_user(model("group_leader", None)).is_err());
        assert!(model_to_user(model("admin", None)).is_err());
        assert!(model_to_user(model("manager", Some("Z9"))).is_err());
    }
}
