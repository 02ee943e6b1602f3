//! Data models module

pub mod chat;
pub mod ticket;
pub mod user;

pub use chat::SupportChat;
pub use ticket::{
    CreateTicketRequest, MediaKind, NewMediaItem, Ticket, TicketMedia, TicketPublication,
    TicketStatus,
};
pub use user::{User, UserRole};
