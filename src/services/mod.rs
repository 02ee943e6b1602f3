//! Services module
//!
//! This module contains business logic services

pub mod album;
pub mod auth;
pub mod dispatch;
pub mod ticket;

// Re-export commonly used services
pub use album::AlbumCollector;
pub use auth::AuthService;
pub use dispatch::{BroadcastOutcome, DispatchService};
pub use ticket::TicketService;

use teloxide::Bot;
use teloxide::types::Message;
use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub ticket_service: TicketService,
    pub dispatch_service: DispatchService,
    pub albums: AlbumCollector<Message>,
    pub db: DatabaseService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(bot: Bot, settings: Settings, db: DatabaseService) -> Self {
        let auth_service = AuthService::new(db.users.clone(), settings.clone());
        let ticket_service =
            TicketService::new(db.tickets.clone(), db.audit.clone(), settings.tickets.clone());
        let dispatch_service =
            DispatchService::new(bot, db.chats.clone(), db.publications.clone());

        Self {
            auth_service,
            ticket_service,
            dispatch_service,
            albums: AlbumCollector::new(),
            db,
        }
    }
}
