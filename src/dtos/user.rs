//! User DTOs - Data Transfer Objects for users

use crate::entities::{User, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Public view of a user; the identity-provider subject is never exposed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserDTO {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            email: value.email,
            name: value.name,
            picture: value.picture,
            role: value.role,
            is_active: value.is_active,
            created_at: value.created_at,
        }
    }
}

/// DTO for creating a user through the API (admin only)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[serde(default)]
    pub picture: String,

    #[validate(length(min = 1, max = 255, message = "Auth id is required"))]
    pub auth_id: String,

    #[serde(default)]
    pub role: UserRole,
}

/// DTO for updating a user; only `Some(_)` fields change
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateUserDTO {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,

    pub picture: Option<String>,

    pub role: Option<UserRole>,

    pub is_active: Option<bool>,
}

impl UpdateUserDTO {
    /// Role and activation flag are administrative fields
    pub fn touches_admin_fields(&self) -> bool {
        self.role.is_some() || self.is_active.is_some()
    }
}

/// Profile data carried by an identity-provider token, used to create or
/// refresh the local user on each authenticated request.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IdentityDTO {
    pub auth_id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
}
