//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{
    AuditRepository, ChatRepository, DatabasePool, PublicationRepository, TicketRepository,
    UserRepository,
};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub chats: ChatRepository,
    pub tickets: TicketRepository,
    pub publications: PublicationRepository,
    pub audit: AuditRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            chats: ChatRepository::new(pool.clone()),
            tickets: TicketRepository::new(pool.clone()),
            publications: PublicationRepository::new(pool.clone()),
            audit: AuditRepository::new(pool),
        }
    }
}
