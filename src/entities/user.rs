//! User entity - local mirror of an identity-provider account

use super::enums::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub picture: String,
    /// Subject identifier issued by the identity provider, unique
    pub auth_id: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// A user may manage their own account, admins may manage any
    pub fn can_manage(&self, target: &Uuid) -> bool {
        self.id == *target || self.is_admin()
    }
}
