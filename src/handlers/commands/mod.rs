//! Command handlers module

pub mod admin;
pub mod start;

pub use admin::{handle_chats, handle_republish, handle_republish_ticket, handle_set_role, handle_tickets};
pub use start::{handle_help, handle_my_history, handle_start, handle_who_am_i};
