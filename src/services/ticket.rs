//! Ticket lifecycle engine
//!
//! The state machine over `new -> accepted -> done`. Both transitions are
//! single conditional updates in the store, so concurrent button presses
//! serialize there: exactly one claimer wins, everyone else observes a
//! user-facing failure.

use tracing::{error, info};
use crate::config::settings::TicketPolicyConfig;
use crate::database::repositories::{AuditRepository, TicketRepository};
use crate::models::ticket::{CreateTicketRequest, Ticket, TicketMedia, TicketStatus};
use crate::models::user::UserRole;
use crate::utils::errors::{DeskGenieError, Result};

#[derive(Debug, Clone)]
pub struct TicketService {
    tickets: TicketRepository,
    audit: AuditRepository,
    policy: TicketPolicyConfig,
}

impl TicketService {
    pub fn new(tickets: TicketRepository, audit: AuditRepository, policy: TicketPolicyConfig) -> Self {
        Self {
            tickets,
            audit,
            policy,
        }
    }

    /// Persist a new ticket with all of its attachments.
    pub async fn create(&self, request: CreateTicketRequest) -> Result<Ticket> {
        let submitter_id = request.submitter_id;
        let ticket = self.tickets.create(request).await?;

        let media_count = self.tickets.media_for(ticket.id).await.map(|m| m.len()).unwrap_or(0);
        info!(
            ticket_id = ticket.id,
            user_id = submitter_id,
            media_count = media_count,
            "Ticket created"
        );
        self.record_audit("ticket_created", submitter_id, &format!("ticket #{}", ticket.id))
            .await;

        Ok(ticket)
    }

    pub async fn get(&self, ticket_id: i64) -> Result<Ticket> {
        self.tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or(DeskGenieError::TicketNotFound { ticket_id })
    }

    pub async fn media_for(&self, ticket_id: i64) -> Result<Vec<TicketMedia>> {
        self.tickets.media_for(ticket_id).await
    }

    pub async fn list_new(&self) -> Result<Vec<Ticket>> {
        self.tickets.list_new().await
    }

    pub async fn list_all(&self) -> Result<Vec<Ticket>> {
        self.tickets.list_all().await
    }

    pub async fn list_for_user(&self, submitter_id: i64) -> Result<Vec<Ticket>> {
        self.tickets.list_for_user(submitter_id).await
    }

    /// Claim a ticket. Only staff and admins may claim; the ticket must
    /// still be `new`. Under concurrent attempts the conditional update
    /// lets exactly one actor through.
    pub async fn claim(&self, ticket_id: i64, actor_id: i64, actor_role: UserRole) -> Result<Ticket> {
        if !actor_role.is_staff() {
            return Err(DeskGenieError::PermissionDenied(format!(
                "User {} may not claim tickets",
                actor_id
            )));
        }

        match self.tickets.claim_if_new(ticket_id, actor_id).await? {
            Some(ticket) => {
                info!(ticket_id = ticket_id, actor_id = actor_id, "Ticket claimed");
                self.record_audit("claim", actor_id, &format!("claimed ticket #{}", ticket_id))
                    .await;
                Ok(ticket)
            }
            None => {
                // The guard did not match: either the ticket is gone or
                // someone else already moved it out of `new`.
                match self.tickets.find_by_id(ticket_id).await? {
                    None => Err(DeskGenieError::TicketNotFound { ticket_id }),
                    Some(_) => Err(DeskGenieError::AlreadyClaimed { ticket_id }),
                }
            }
        }
    }

    /// Resolve a ticket. Requires status `accepted`; when the claimant
    /// policy is on, the actor must also be the claimer. Re-resolving a
    /// done ticket or resolving an unclaimed one is an `InvalidTransition`,
    /// never a silent success.
    pub async fn resolve(&self, ticket_id: i64, actor_id: i64, actor_role: UserRole) -> Result<Ticket> {
        if !actor_role.is_staff() {
            return Err(DeskGenieError::PermissionDenied(format!(
                "User {} may not resolve tickets",
                actor_id
            )));
        }

        let claimant = if self.policy.resolve_requires_claimant {
            Some(actor_id)
        } else {
            None
        };

        match self.tickets.resolve_if_accepted(ticket_id, claimant).await? {
            Some(ticket) => {
                info!(ticket_id = ticket_id, actor_id = actor_id, "Ticket resolved");
                self.record_audit("resolve", actor_id, &format!("resolved ticket #{}", ticket_id))
                    .await;
                Ok(ticket)
            }
            None => match self.tickets.find_by_id(ticket_id).await? {
                None => Err(DeskGenieError::TicketNotFound { ticket_id }),
                Some(ticket) if ticket.status == TicketStatus::Accepted => {
                    // Guard matched the status but not the claimant.
                    Err(DeskGenieError::PermissionDenied(format!(
                        "Only the claimant may resolve ticket #{}",
                        ticket_id
                    )))
                }
                Some(ticket) => Err(DeskGenieError::InvalidTransition {
                    from: ticket.status.to_string(),
                    to: TicketStatus::Done.to_string(),
                }),
            },
        }
    }

    /// Audit writes never block the action they describe.
    async fn record_audit(&self, action: &str, actor_id: i64, details: &str) {
        if let Err(e) = self.audit.record(action, actor_id, Some(details)).await {
            error!(action = action, actor_id = actor_id, error = %e, "Failed to write audit record");
        }
    }
}
