//! Ticket repository implementation
//!
//! Durable ticket storage plus the two atomic conditional updates that
//! serialize the lifecycle under concurrent button presses. The store is
//! the only synchronization point: the status check and the status change
//! are always a single statement.

use sqlx::PgPool;
use chrono::Utc;
use crate::models::ticket::{CreateTicketRequest, Ticket, TicketMedia};
use crate::utils::errors::DeskGenieError;

#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a ticket and all of its attachments in one transaction.
    /// A ticket row without its media (or the reverse) is never visible.
    pub async fn create(&self, request: CreateTicketRequest) -> Result<Ticket, DeskGenieError> {
        let mut tx = self.pool.begin().await?;

        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets (submitter_id, submitter_username, text, status, created_at, updated_at)
            VALUES ($1, $2, $3, 'new', $4, $4)
            RETURNING id, submitter_id, submitter_username, text, status, claimed_by, created_at, updated_at
            "#
        )
        .bind(request.submitter_id)
        .bind(&request.submitter_username)
        .bind(&request.text)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in request.media.iter().enumerate() {
            sqlx::query(
                "INSERT INTO ticket_media (ticket_id, kind, file_id, position) VALUES ($1, $2, $3, $4)"
            )
            .bind(ticket.id)
            .bind(item.kind)
            .bind(&item.file_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(ticket)
    }

    /// Find ticket by ID
    pub async fn find_by_id(&self, ticket_id: i64) -> Result<Option<Ticket>, DeskGenieError> {
        let ticket = sqlx::query_as::<_, Ticket>(
            "SELECT id, submitter_id, submitter_username, text, status, claimed_by, created_at, updated_at FROM tickets WHERE id = $1"
        )
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Unclaimed backlog, oldest first (republication order)
    pub async fn list_new(&self) -> Result<Vec<Ticket>, DeskGenieError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT id, submitter_id, submitter_username, text, status, claimed_by, created_at, updated_at FROM tickets WHERE status = 'new' ORDER BY created_at ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// All tickets, newest first (history view)
    pub async fn list_all(&self) -> Result<Vec<Ticket>, DeskGenieError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT id, submitter_id, submitter_username, text, status, claimed_by, created_at, updated_at FROM tickets ORDER BY created_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// One submitter's tickets, newest first
    pub async fn list_for_user(&self, submitter_id: i64) -> Result<Vec<Ticket>, DeskGenieError> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT id, submitter_id, submitter_username, text, status, claimed_by, created_at, updated_at FROM tickets WHERE submitter_id = $1 ORDER BY created_at DESC"
        )
        .bind(submitter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// Ordered attachments of a ticket
    pub async fn media_for(&self, ticket_id: i64) -> Result<Vec<TicketMedia>, DeskGenieError> {
        let media = sqlx::query_as::<_, TicketMedia>(
            "SELECT id, ticket_id, kind, file_id, position FROM ticket_media WHERE ticket_id = $1 ORDER BY position ASC"
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(media)
    }

    /// Atomic claim: succeeds only while the ticket is still `new`, so
    /// exactly one of any number of concurrent claimers wins. Returns the
    /// updated row, or None when the guard did not match (missing ticket
    /// or already claimed; the service layer disambiguates).
    pub async fn claim_if_new(&self, ticket_id: i64, staff_id: i64) -> Result<Option<Ticket>, DeskGenieError> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            UPDATE tickets
            SET status = 'accepted', claimed_by = $2, updated_at = $3
            WHERE id = $1 AND status = 'new'
            RETURNING id, submitter_id, submitter_username, text, status, claimed_by, created_at, updated_at
            "#
        )
        .bind(ticket_id)
        .bind(staff_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Atomic resolve: succeeds only from `accepted`. When `claimant` is
    /// given, the row must also be claimed by that actor.
    pub async fn resolve_if_accepted(&self, ticket_id: i64, claimant: Option<i64>) -> Result<Option<Ticket>, DeskGenieError> {
        let ticket = match claimant {
            Some(claimant_id) => {
                sqlx::query_as::<_, Ticket>(
                    r#"
                    UPDATE tickets
                    SET status = 'done', updated_at = $3
                    WHERE id = $1 AND status = 'accepted' AND claimed_by = $2
                    RETURNING id, submitter_id, submitter_username, text, status, claimed_by, created_at, updated_at
                    "#
                )
                .bind(ticket_id)
                .bind(claimant_id)
                .bind(Utc::now())
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Ticket>(
                    r#"
                    UPDATE tickets
                    SET status = 'done', updated_at = $2
                    WHERE id = $1 AND status = 'accepted'
                    RETURNING id, submitter_id, submitter_username, text, status, claimed_by, created_at, updated_at
                    "#
                )
                .bind(ticket_id)
                .bind(Utc::now())
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(ticket)
    }
}
