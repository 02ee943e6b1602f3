//! Support chat repository implementation
//!
//! The broadcast destination registry. Chats are registered inactive when
//! the bot joins them; activation is an admin action.

use sqlx::PgPool;
use crate::models::chat::SupportChat;
use crate::utils::errors::DeskGenieError;

#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a chat as a candidate destination. Idempotent: re-registering
    /// an existing chat leaves its row (including `is_active`) untouched.
    pub async fn register(&self, telegram_id: i64, title: Option<&str>) -> Result<SupportChat, DeskGenieError> {
        sqlx::query(
            r#"
            INSERT INTO support_chats (telegram_id, title, is_active)
            VALUES ($1, $2, FALSE)
            ON CONFLICT (telegram_id) DO NOTHING
            "#
        )
        .bind(telegram_id)
        .bind(title)
        .execute(&self.pool)
        .await?;

        let chat = self
            .find_by_telegram_id(telegram_id)
            .await?
            .ok_or(DeskGenieError::ChatNotFound { chat_id: telegram_id })?;

        Ok(chat)
    }

    /// Find chat by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<SupportChat>, DeskGenieError> {
        let chat = sqlx::query_as::<_, SupportChat>(
            "SELECT id, telegram_id, title, is_active, approved_by, created_at FROM support_chats WHERE telegram_id = $1"
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chat)
    }

    /// Flip the activation flag, recording the approving admin. Returns
    /// false when the chat is unknown; the caller reports the no-op.
    pub async fn set_active(&self, telegram_id: i64, active: bool, approved_by: i64) -> Result<bool, DeskGenieError> {
        let result = sqlx::query(
            "UPDATE support_chats SET is_active = $2, approved_by = $3 WHERE telegram_id = $1"
        )
        .bind(telegram_id)
        .bind(active)
        .bind(approved_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All registered chats, for the administrative display
    pub async fn list_all(&self) -> Result<Vec<SupportChat>, DeskGenieError> {
        let chats = sqlx::query_as::<_, SupportChat>(
            "SELECT id, telegram_id, title, is_active, approved_by, created_at FROM support_chats ORDER BY created_at"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(chats)
    }

    /// The authoritative broadcast-target set: ids of active chats only
    pub async fn list_active_ids(&self) -> Result<Vec<i64>, DeskGenieError> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT telegram_id FROM support_chats WHERE is_active ORDER BY created_at"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
