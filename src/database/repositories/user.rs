//! User repository implementation
//!
//! The identity and role store. Users are created on first interaction and
//! never deleted; re-seeing a user refreshes the handle but never touches
//! the role.

use sqlx::PgPool;
use chrono::Utc;
use crate::models::user::{User, UserRole};
use crate::utils::errors::DeskGenieError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create-or-refresh a user. On first sight the role is `user`; on
    /// repeat sight only the handle is refreshed.
    pub async fn upsert(&self, telegram_id: i64, username: Option<&str>) -> Result<User, DeskGenieError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (telegram_id, username, role, created_at, updated_at)
            VALUES ($1, $2, 'user', $3, $3)
            ON CONFLICT (telegram_id)
            DO UPDATE SET username = EXCLUDED.username, updated_at = EXCLUDED.updated_at
            RETURNING id, telegram_id, username, role, created_at, updated_at
            "#
        )
        .bind(telegram_id)
        .bind(username)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, DeskGenieError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, telegram_id, username, role, created_at, updated_at FROM users WHERE telegram_id = $1"
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Set the persisted role of a user
    pub async fn set_role(&self, telegram_id: i64, role: UserRole) -> Result<User, DeskGenieError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $2, updated_at = $3
            WHERE telegram_id = $1
            RETURNING id, telegram_id, username, role, created_at, updated_at
            "#
        )
        .bind(telegram_id)
        .bind(role)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DeskGenieError::UserNotFound { telegram_id })?;

        Ok(user)
    }

    /// Telegram ids of all users with a persisted admin role
    pub async fn list_admin_ids(&self) -> Result<Vec<i64>, DeskGenieError> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT telegram_id FROM users WHERE role = 'admin'"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
