//! Callback query handlers module
//!
//! Routes inline-button presses: `claim:<ticket>`, `resolve:<ticket>` and
//! `chat:<action>:<chat>`. Every press gets exactly one acknowledgement;
//! lifecycle violations surface as alert popups instead of silent drops.

use teloxide::{Bot, prelude::*};
use teloxide::types::{CallbackQuery, ChatId, MaybeInaccessibleMessage, ParseMode};
use teloxide::utils::html;
use tracing::{info, warn};
use crate::models::user::UserRole;
use crate::services::ServiceFactory;
use crate::utils::errors::{DeskGenieError, Result};
use crate::utils::helpers::{resolve_keyboard, user_link};

/// What the pressing user sees: a toast for success, an alert for failure.
struct CallbackReply {
    text: String,
    alert: bool,
}

impl CallbackReply {
    fn notice(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            alert: false,
        }
    }
}

/// Handle all callback queries from inline keyboards.
pub async fn handle_callback(bot: Bot, query: CallbackQuery, services: ServiceFactory) -> Result<()> {
    let Some(data) = query.data.clone() else {
        bot.answer_callback_query(query.id.clone()).await?;
        return Ok(());
    };

    let actor_id = query.from.id.0 as i64;
    services
        .db
        .users
        .upsert(actor_id, query.from.username.as_deref())
        .await?;

    let parts: Vec<&str> = data.split(':').collect();
    let reply = match parts.as_slice() {
        ["claim", id] => handle_claim(&bot, &query, parse_id(id)?, &services).await,
        ["resolve", id] => handle_resolve(&bot, &query, parse_id(id)?, &services).await,
        ["chat", action, id] => handle_chat_action(&query, action, parse_id(id)?, &services).await,
        _ => {
            warn!(user_id = actor_id, data = %data, "Unknown callback data");
            Ok(CallbackReply::notice("Unknown action"))
        }
    };

    match reply {
        Ok(reply) => {
            bot.answer_callback_query(query.id.clone())
                .text(reply.text)
                .show_alert(reply.alert)
                .await?;
            Ok(())
        }
        Err(e) if e.is_user_facing() => {
            bot.answer_callback_query(query.id.clone())
                .text(e.user_message())
                .show_alert(true)
                .await?;
            Ok(())
        }
        Err(e) => {
            // Answer before propagating so the button stops spinning.
            bot.answer_callback_query(query.id.clone())
                .text("Something went wrong. Please try again.")
                .show_alert(true)
                .await?;
            Err(e)
        }
    }
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| DeskGenieError::InvalidInput(format!("Bad id in callback data: {}", raw)))
}

/// Claim button on a broadcast post.
async fn handle_claim(
    bot: &Bot,
    query: &CallbackQuery,
    ticket_id: i64,
    services: &ServiceFactory,
) -> Result<CallbackReply> {
    let actor_id = query.from.id.0 as i64;
    let role = services.auth_service.role_of(actor_id).await?;
    let ticket = services.ticket_service.claim(ticket_id, actor_id, role).await?;

    // Mark the post in the support chat. Editing the body also drops the
    // claim button, so a stale press resolves in the store, not the UI.
    if let Some(MaybeInaccessibleMessage::Regular(message)) = &query.message {
        let claimed_line = format!(
            "\n\nClaimed by {}",
            user_link(actor_id, query.from.username.as_deref())
        );
        let edit = if let Some(caption) = message.caption() {
            bot.edit_message_caption(message.chat.id, message.id)
                .caption(format!("{}{}", html::escape(caption), claimed_line))
                .parse_mode(ParseMode::Html)
                .await
                .map(|_| ())
        } else if let Some(text) = message.text() {
            bot.edit_message_text(
                message.chat.id,
                message.id,
                format!("{}{}", html::escape(text), claimed_line),
            )
            .parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
        } else {
            Ok(())
        };
        if let Err(e) = edit {
            warn!(ticket_id = ticket_id, error = %e, "Could not mark broadcast post as claimed");
        }
    }

    // The claimer gets the resolve control in their DM.
    if let Err(e) = bot
        .send_message(
            ChatId(actor_id),
            format!(
                "You claimed ticket #{}.\n\n{}",
                ticket.id,
                ticket.text.as_deref().unwrap_or("(no text)")
            ),
        )
        .reply_markup(resolve_keyboard(ticket.id))
        .await
    {
        warn!(ticket_id = ticket_id, user_id = actor_id, error = %e, "Could not DM the claimer");
    }

    if let Err(e) = bot
        .send_message(
            ChatId(ticket.submitter_id),
            format!("Your ticket #{} was picked up by the genies.", ticket.id),
        )
        .await
    {
        warn!(ticket_id = ticket_id, error = %e, "Could not notify the submitter about the claim");
    }

    Ok(CallbackReply::notice(format!("Ticket #{} is yours", ticket.id)))
}

/// Resolve button in the claimer's DM.
async fn handle_resolve(
    bot: &Bot,
    query: &CallbackQuery,
    ticket_id: i64,
    services: &ServiceFactory,
) -> Result<CallbackReply> {
    let actor_id = query.from.id.0 as i64;
    let role = services.auth_service.role_of(actor_id).await?;
    let ticket = services.ticket_service.resolve(ticket_id, actor_id, role).await?;

    if let Some(MaybeInaccessibleMessage::Regular(message)) = &query.message {
        if let Err(e) = bot
            .edit_message_reply_markup(message.chat.id, message.id)
            .await
        {
            warn!(ticket_id = ticket_id, error = %e, "Could not remove resolve keyboard");
        }
    }

    if let Err(e) = bot
        .send_message(
            ChatId(ticket.submitter_id),
            format!("Your ticket #{} has been resolved. Thank you!", ticket.id),
        )
        .await
    {
        warn!(ticket_id = ticket_id, error = %e, "Could not notify the submitter about resolution");
    }

    Ok(CallbackReply::notice(format!("Ticket #{} resolved", ticket.id)))
}

/// Approve/decline/activate/deactivate a support chat. Admin only.
async fn handle_chat_action(
    query: &CallbackQuery,
    action: &str,
    chat_id: i64,
    services: &ServiceFactory,
) -> Result<CallbackReply> {
    let actor_id = query.from.id.0 as i64;
    services.auth_service.require(actor_id, UserRole::Admin).await?;

    let activate = match action {
        "approve" | "activate" => true,
        "decline" | "deactivate" => false,
        other => {
            return Err(DeskGenieError::InvalidInput(format!(
                "Unknown chat action: {}",
                other
            )))
        }
    };

    if !services.db.chats.set_active(chat_id, activate, actor_id).await? {
        return Ok(CallbackReply::notice("That chat is not registered"));
    }

    info!(chat_id = chat_id, actor_id = actor_id, active = activate, "Chat activation changed");
    if let Err(e) = services
        .db
        .audit
        .record(
            if activate { "chat_activated" } else { "chat_deactivated" },
            actor_id,
            Some(&format!("chat {}", chat_id)),
        )
        .await
    {
        warn!(chat_id = chat_id, error = %e, "Failed to write audit record");
    }

    Ok(CallbackReply::notice(if activate {
        "Chat will now receive tickets"
    } else {
        "Chat will no longer receive tickets"
    }))
}
