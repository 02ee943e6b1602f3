//! DeskGenie Telegram Bot
//!
//! A helpdesk ticketing bot: users file tickets (text and media) in a
//! direct chat, the bot broadcasts them to the active support chats, and
//! staff claim and resolve them through inline buttons. Admins manage
//! destination chats and user roles.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{DeskGenieError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;
