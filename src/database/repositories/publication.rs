//! Publication ledger repository
//!
//! Records which outbound message represents a ticket in each chat. The
//! UNIQUE (ticket_id, chat_id) key is the de-duplication guard that keeps
//! republication idempotent.

use sqlx::PgPool;
use crate::models::ticket::TicketPublication;
use crate::utils::errors::DeskGenieError;

#[derive(Debug, Clone)]
pub struct PublicationRepository {
    pool: PgPool,
}

impl PublicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a publication row. Returns false when the (ticket, chat) pair
    /// is already recorded; rows are never updated or deleted.
    pub async fn record(&self, ticket_id: i64, chat_id: i64, message_id: i32) -> Result<bool, DeskGenieError> {
        let result = sqlx::query(
            r#"
            INSERT INTO ticket_publications (ticket_id, chat_id, message_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (ticket_id, chat_id) DO NOTHING
            "#
        )
        .bind(ticket_id)
        .bind(chat_id)
        .bind(message_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Existence check consulted by the dispatcher before every send
    pub async fn is_published(&self, ticket_id: i64, chat_id: i64) -> Result<bool, DeskGenieError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM ticket_publications WHERE ticket_id = $1 AND chat_id = $2)"
        )
        .bind(ticket_id)
        .bind(chat_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    /// Publications of one ticket, for targeted edits
    pub async fn list_for_ticket(&self, ticket_id: i64) -> Result<Vec<TicketPublication>, DeskGenieError> {
        let rows = sqlx::query_as::<_, TicketPublication>(
            "SELECT id, ticket_id, chat_id, message_id, published_at FROM ticket_publications WHERE ticket_id = $1 ORDER BY published_at"
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
