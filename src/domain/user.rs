//! User domain entity, caller identity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{ROLE_ADMIN, ROLE_USER};
use crate::errors::{AppError, AppResult};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub phone: Option<String>,
    /// Disabled accounts cannot log in
    pub active: bool,
    /// Plan currently assigned to the user
    pub plan_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Identity used for authorization checks.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            role: self.role,
        }
    }
}

/// Data needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
}

/// Fields an administrator may change on a user. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UserPatch {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    #[schema(example = "Ana")]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    #[schema(example = "García")]
    pub last_name: Option<String>,
    #[schema(example = "+54 11 5555-0000")]
    pub phone: Option<String>,
    #[schema(example = "user")]
    pub role: Option<UserRole>,
    pub active: Option<bool>,
    /// Assigning a plan grants its credits and hours
    pub plan_id: Option<i32>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.role.is_none()
            && self.active.is_none()
            && self.plan_id.is_none()
    }
}

/// Fields users may change on their own account
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProfilePatch {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl From<ProfilePatch> for UserPatch {
    fn from(patch: ProfilePatch) -> Self {
        Self {
            first_name: patch.first_name,
            last_name: patch.last_name,
            phone: patch.phone,
            ..Default::default()
        }
    }
}

/// Authenticated caller: who is acting and with which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: UserRole,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Admins act on anything; everyone else only on what they own.
    pub fn ensure_owns(&self, owner_id: i32) -> AppResult<()> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "Ana")]
    pub first_name: String,
    #[schema(example = "García")]
    pub last_name: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "user")]
    pub role: String,
    pub phone: Option<String>,
    pub active: bool,
    pub plan_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role.to_string(),
            phone: user.phone,
            active: user.active,
            plan_id: user.plan_id,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_bypasses_ownership() {
        let admin = Actor {
            user_id: 1,
            role: UserRole::Admin,
        };
        assert!(admin.ensure_owns(99).is_ok());
    }

    #[test]
    fn user_must_own_target() {
        let user = Actor {
            user_id: 7,
            role: UserRole::User,
        };
        assert!(user.ensure_owns(7).is_ok());
        assert!(matches!(user.ensure_owns(8), Err(AppError::Forbidden)));
    }

    #[test]
    fn unknown_role_defaults_to_user() {
        assert_eq!(UserRole::from("admin"), UserRole::Admin);
        assert_eq!(UserRole::from("cliente"), UserRole::User);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(UserPatch::default().is_empty());
        let patch = UserPatch {
            active: Some(false),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
