//! Administrative commands: /chats, /tickets, /setrole, /republish,
//! /republishticket. Every handler requires the admin role first.

use std::str::FromStr;
use teloxide::{Bot, prelude::*};
use teloxide::types::{InlineKeyboardMarkup, Message};
use tracing::info;
use crate::models::user::UserRole;
use crate::services::{BroadcastOutcome, ServiceFactory};
use crate::utils::errors::{DeskGenieError, Result};
use crate::utils::helpers::{chat_toggle_button, chunk_lines, ticket_summary_line, MESSAGE_CHUNK_LIMIT};

fn actor_id(msg: &Message) -> Result<i64> {
    msg.from
        .as_ref()
        .map(|u| u.id.0 as i64)
        .ok_or_else(|| DeskGenieError::InvalidInput("Command without a sender".to_string()))
}

/// Handle the /chats command: list registered chats with a toggle per chat.
pub async fn handle_chats(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let actor = actor_id(&msg)?;
    services.auth_service.require(actor, UserRole::Admin).await?;

    let chats = services.db.chats.list_all().await?;
    if chats.is_empty() {
        bot.send_message(msg.chat.id, "No support chats registered. Add me to a chat first.")
            .await?;
        return Ok(());
    }

    let lines: Vec<String> = chats
        .iter()
        .map(|c| {
            format!(
                "{} {} (id: {})",
                if c.is_active { "🟢" } else { "⚪" },
                c.display_name(),
                c.telegram_id
            )
        })
        .collect();
    let keyboard = InlineKeyboardMarkup::new(
        chats
            .iter()
            .map(|c| vec![chat_toggle_button(c.telegram_id, &c.display_name(), c.is_active)]),
    );

    bot.send_message(msg.chat.id, format!("Support chats:\n{}", lines.join("\n")))
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Handle the /tickets command: one summary line per ticket, newest first.
pub async fn handle_tickets(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let actor = actor_id(&msg)?;
    services.auth_service.require(actor, UserRole::Admin).await?;

    let tickets = services.ticket_service.list_all().await?;
    if tickets.is_empty() {
        bot.send_message(msg.chat.id, "No tickets yet.").await?;
        return Ok(());
    }

    let lines: Vec<String> = tickets
        .iter()
        .map(|t| {
            let mut line = ticket_summary_line(t.id, &t.status.to_string(), t.text.as_deref());
            if let Some(claimer) = t.claimed_by {
                line.push_str(&format!(" (claimed by {})", claimer));
            }
            line
        })
        .collect();

    for chunk in chunk_lines(&lines, MESSAGE_CHUNK_LIMIT) {
        bot.send_message(msg.chat.id, chunk).await?;
    }
    Ok(())
}

/// Handle the /setrole command: `/setrole <telegram_id> <user|staff|admin>`.
pub async fn handle_set_role(bot: Bot, msg: Message, args: String, services: ServiceFactory) -> Result<()> {
    let actor = actor_id(&msg)?;
    services.auth_service.require(actor, UserRole::Admin).await?;

    let mut parts = args.split_whitespace();
    let (Some(raw_id), Some(raw_role), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DeskGenieError::InvalidInput(
            "Usage: /setrole <telegram_id> <user|staff|admin>".to_string(),
        ));
    };

    let telegram_id: i64 = raw_id
        .parse()
        .map_err(|_| DeskGenieError::InvalidInput(format!("Not a telegram id: {}", raw_id)))?;
    let role = UserRole::from_str(raw_role)?;

    let user = services.db.users.set_role(telegram_id, role).await?;
    info!(actor_id = actor, user_id = telegram_id, role = %role, "Role changed");

    bot.send_message(
        msg.chat.id,
        format!("User {} is now {}.", user.telegram_id, user.role),
    )
    .await?;
    Ok(())
}

/// Handle the /republish command: rebroadcast every still-unclaimed ticket.
/// The publication ledger keeps chats that already carry a post silent.
pub async fn handle_republish(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let actor = actor_id(&msg)?;
    services.auth_service.require(actor, UserRole::Admin).await?;

    let tickets = services.ticket_service.list_new().await?;
    if tickets.is_empty() {
        bot.send_message(msg.chat.id, "No unclaimed tickets to republish.").await?;
        return Ok(());
    }

    let mut total = BroadcastOutcome::default();
    for ticket in &tickets {
        let media = services.ticket_service.media_for(ticket.id).await?;
        total.absorb(
            services
                .dispatch_service
                .broadcast(ticket, &media, false)
                .await?,
        );
    }

    info!(actor_id = actor, tickets = tickets.len(), sent = total.sent, "Republish finished");
    bot.send_message(
        msg.chat.id,
        format!(
            "Republished {} ticket(s): {} sent, {} already published, {} failed.",
            tickets.len(),
            total.sent,
            total.skipped,
            total.failed
        ),
    )
    .await?;
    Ok(())
}

/// Handle the /republishticket command: `/republishticket <id> [force]`.
/// With `force` the ledger is bypassed and already-covered chats get a
/// fresh post.
pub async fn handle_republish_ticket(
    bot: Bot,
    msg: Message,
    args: String,
    services: ServiceFactory,
) -> Result<()> {
    let actor = actor_id(&msg)?;
    services.auth_service.require(actor, UserRole::Admin).await?;

    let mut parts = args.split_whitespace();
    let (Some(raw_id), flag, None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DeskGenieError::InvalidInput(
            "Usage: /republishticket <id> [force]".to_string(),
        ));
    };
    let force = match flag {
        None => false,
        Some("force") => true,
        Some(other) => {
            return Err(DeskGenieError::InvalidInput(format!(
                "Unknown flag: {} (did you mean `force`?)",
                other
            )))
        }
    };

    let ticket_id: i64 = raw_id
        .parse()
        .map_err(|_| DeskGenieError::InvalidInput(format!("Not a ticket id: {}", raw_id)))?;

    let ticket = services.ticket_service.get(ticket_id).await?;
    let media = services.ticket_service.media_for(ticket.id).await?;
    let outcome = services
        .dispatch_service
        .broadcast(&ticket, &media, force)
        .await?;

    info!(actor_id = actor, ticket_id = ticket_id, force = force, sent = outcome.sent, "Single-ticket republish");
    bot.send_message(
        msg.chat.id,
        format!(
            "Ticket #{}: {} sent, {} already published, {} failed.",
            ticket.id, outcome.sent, outcome.skipped, outcome.failed
        ),
    )
    .await?;
    Ok(())
}
