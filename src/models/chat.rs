//! Support chat model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A candidate broadcast destination. Only chats with `is_active = true`
/// receive new tickets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupportChat {
    pub id: i64,
    pub telegram_id: i64,
    pub title: Option<String>,
    pub is_active: bool,
    /// Admin who last flipped the activation flag.
    pub approved_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl SupportChat {
    /// Display name for administrative listings.
    pub fn display_name(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => self.telegram_id.to_string(),
        }
    }
}
