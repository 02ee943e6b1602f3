//! Ticket, ticket media and publication models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Ticket lifecycle states. Transitions are strictly
/// `new -> accepted -> done`; no skips, no backward moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    New,
    Accepted,
    Done,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Accepted => "accepted",
            TicketStatus::Done => "done",
        }
    }

    /// Whether the state machine allows moving from `self` to `to`.
    pub fn can_transition_to(&self, to: TicketStatus) -> bool {
        matches!(
            (self, to),
            (TicketStatus::New, TicketStatus::Accepted)
                | (TicketStatus::Accepted, TicketStatus::Done)
        )
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attachment kind, decided once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    /// Audio cannot join a photo/video media group on the platform side.
    pub fn groupable(&self) -> bool {
        matches!(self, MediaKind::Photo | MediaKind::Video)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i64,
    pub submitter_id: i64,
    pub submitter_username: Option<String>,
    pub text: Option<String>,
    pub status: TicketStatus,
    pub claimed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketMedia {
    pub id: i64,
    pub ticket_id: i64,
    pub kind: MediaKind,
    pub file_id: String,
    pub position: i32,
}

/// Attachment payload for ticket creation, before it has a row id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMediaItem {
    pub kind: MediaKind,
    pub file_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub submitter_id: i64,
    pub submitter_username: Option<String>,
    pub text: Option<String>,
    pub media: Vec<NewMediaItem>,
}

/// Join record: which outbound message represents a ticket in a chat.
/// At most one row per (ticket, chat) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketPublication {
    pub id: i64,
    pub ticket_id: i64,
    pub chat_id: i64,
    pub message_id: i32,
    pub published_at: DateTime<Utc>,
}
