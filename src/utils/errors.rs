//! Error handling for DeskGenie
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for DeskGenie application
#[derive(Error, Debug)]
pub enum DeskGenieError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {telegram_id}")]
    UserNotFound { telegram_id: i64 },

    #[error("Ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: i64 },

    #[error("Support chat not found: {chat_id}")]
    ChatNotFound { chat_id: i64 },

    #[error("Ticket #{ticket_id} is already claimed")]
    AlreadyClaimed { ticket_id: i64 },

    #[error("Invalid ticket transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for DeskGenie operations
pub type Result<T> = std::result::Result<T, DeskGenieError>;

impl DeskGenieError {
    /// Check if the error should be shown to the triggering actor
    /// rather than propagated.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DeskGenieError::PermissionDenied(_)
                | DeskGenieError::UserNotFound { .. }
                | DeskGenieError::TicketNotFound { .. }
                | DeskGenieError::ChatNotFound { .. }
                | DeskGenieError::AlreadyClaimed { .. }
                | DeskGenieError::InvalidTransition { .. }
                | DeskGenieError::InvalidInput(_)
        )
    }

    /// Short acknowledgement text for user-facing failures.
    pub fn user_message(&self) -> String {
        match self {
            DeskGenieError::PermissionDenied(_) => "You are not allowed to do that.".to_string(),
            DeskGenieError::UserNotFound { telegram_id } => {
                format!("User {} is not registered.", telegram_id)
            }
            DeskGenieError::TicketNotFound { ticket_id } => {
                format!("Ticket #{} was not found.", ticket_id)
            }
            DeskGenieError::ChatNotFound { chat_id } => {
                format!("Chat {} is not registered.", chat_id)
            }
            DeskGenieError::AlreadyClaimed { ticket_id } => {
                format!("Ticket #{} is already taken.", ticket_id)
            }
            DeskGenieError::InvalidTransition { from, to } => {
                format!("Ticket cannot go from {} to {}.", from, to)
            }
            DeskGenieError::InvalidInput(msg) => msg.clone(),
            other => format!("Something went wrong: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(DeskGenieError::AlreadyClaimed { ticket_id: 1 }.is_user_facing());
        assert!(DeskGenieError::TicketNotFound { ticket_id: 1 }.is_user_facing());
        assert!(DeskGenieError::PermissionDenied("nope".into()).is_user_facing());
        assert!(!DeskGenieError::Config("missing token".into()).is_user_facing());
    }

    #[test]
    fn test_user_message_mentions_ticket() {
        let msg = DeskGenieError::AlreadyClaimed { ticket_id: 42 }.user_message();
        assert!(msg.contains("#42"));
    }
}
