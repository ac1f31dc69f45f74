//! UserRepository - persistence of users

use super::{Create, Delete, PoolType, Read, ReadMany, Update};
use crate::dtos::{CreateUserDTO, IdentityDTO, Pagination, UpdateUserDTO};
use crate::entities::{User, UserRole};
use chrono::Utc;
use sqlx::{Error, QueryBuilder};
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub struct UserRepository {
    connection_pool: PoolType,
}

impl UserRepository {
    pub fn new(connection_pool: PoolType) -> Self {
        Self { connection_pool }
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        debug!("Finding user by email");
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.connection_pool)
            .await
    }

    /// One page of users, oldest first, plus the total count
    #[instrument(skip(self), fields(page = page.page, page_size = page.page_size))]
    pub async fn list(&self, page: &Pagination) -> Result<(Vec<User>, i64), Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.connection_pool)
            .await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at ASC LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.connection_pool)
        .await?;

        Ok((users, total))
    }

    /// Creates the local user for an identity on first sight, otherwise
    /// refreshes its profile fields from the token.
    ///
    /// Single statement on the `auth_id` unique index: concurrent first
    /// requests of the same identity all resolve to one row.
    #[instrument(skip(self, identity), fields(auth_id = %identity.auth_id))]
    pub async fn sync_identity(&self, identity: &IdentityDTO) -> Result<User, Error> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, picture, auth_id, role, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            ON CONFLICT (auth_id) DO UPDATE SET
                email = excluded.email,
                name = excluded.name,
                picture = excluded.picture,
                updated_at = excluded.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&identity.email)
        .bind(&identity.name)
        .bind(&identity.picture)
        .bind(&identity.auth_id)
        .bind(UserRole::User)
        .bind(now)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await?;

        debug!(user_id = %user.id, "Identity synced");
        Ok(user)
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        debug!("Creating user");
        let now = Utc::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, picture, auth_id, role, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.email)
        .bind(&data.name)
        .bind(&data.picture)
        .bind(&data.auth_id)
        .bind(data.role)
        .bind(now)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }
}

impl Read<User, Uuid> for UserRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn read(&self, id: &Uuid) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl ReadMany<User, Uuid> for UserRepository {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn read_many(&self, ids: &[Uuid]) -> Result<Vec<User>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder = QueryBuilder::new("SELECT * FROM users WHERE id IN (");
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        query_builder
            .build_query_as::<User>()
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Update<User, UpdateUserDTO, Uuid> for UserRepository {
    #[instrument(skip(self, data), fields(user_id = %id))]
    async fn update(&self, id: &Uuid, data: &UpdateUserDTO) -> Result<User, Error> {
        debug!("Updating user");
        let current = self.read(id).await?.ok_or(Error::RowNotFound)?;

        if data.email.is_none()
            && data.name.is_none()
            && data.picture.is_none()
            && data.role.is_none()
            && data.is_active.is_none()
        {
            debug!("No fields to update, returning current user");
            return Ok(current);
        }

        let mut query_builder = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref email) = data.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }
        if let Some(ref name) = data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(ref picture) = data.picture {
            separated.push("picture = ");
            separated.push_bind_unseparated(picture);
        }
        if let Some(role) = data.role {
            separated.push("role = ");
            separated.push_bind_unseparated(role);
        }
        if let Some(is_active) = data.is_active {
            separated.push("is_active = ");
            separated.push_bind_unseparated(is_active);
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query_builder.push(" WHERE id = ");
        query_builder.push_bind(id);
        query_builder.push(" RETURNING *");

        let user = query_builder
            .build_query_as::<User>()
            .fetch_one(&self.connection_pool)
            .await?;

        info!("User updated");
        Ok(user)
    }
}

impl Delete<Uuid> for UserRepository {
    /// Hard delete; events and RSVPs of the user go with it (ON DELETE CASCADE)
    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete(&self, id: &Uuid) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        info!("User deleted");
        Ok(())
    }
}
