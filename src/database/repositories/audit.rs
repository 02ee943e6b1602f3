//! Audit log repository
//!
//! Write-only action trail. A failed audit write is logged and swallowed by
//! callers; it never blocks the action itself.

use sqlx::PgPool;
use crate::utils::errors::DeskGenieError;

#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one action record
    pub async fn record(&self, action: &str, actor_id: i64, details: Option<&str>) -> Result<(), DeskGenieError> {
        sqlx::query(
            "INSERT INTO audit_log (action, actor_id, details) VALUES ($1, $2, $3)"
        )
        .bind(action)
        .bind(actor_id)
        .bind(details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
