//! Repository implementations

pub mod audit;
pub mod chat;
pub mod publication;
pub mod ticket;
pub mod user;

pub use audit::AuditRepository;
pub use chat::ChatRepository;
pub use publication::PublicationRepository;
pub use ticket::TicketRepository;
pub use user::UserRepository;
