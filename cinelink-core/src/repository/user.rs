use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::str::FromStr;

use crate::{
    models::{User, UserId, UserRole},
    Error, Result,
};

/// Read-only port onto the identity store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>>;
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, display_name, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let role: String = row.try_get("role")?;

        Ok(Some(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            display_name: row.try_get("display_name")?,
            role: UserRole::from_str(&role).map_err(Error::Internal)?,
        }))
    }
}
