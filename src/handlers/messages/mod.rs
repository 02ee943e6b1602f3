//! Message handlers module
//!
//! Ticket intake: any non-command direct message (text, photo, video,
//! audio, or a whole album) becomes a ticket and is broadcast to the
//! active support chats. Also handles the bot being added to a chat.

use teloxide::{Bot, prelude::*};
use teloxide::types::{ChatId, Message};
use tracing::{debug, info, warn};
use crate::models::ticket::{CreateTicketRequest, MediaKind, NewMediaItem};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::chat_approval_keyboard;

/// Handle an incoming non-command message.
pub async fn handle_message(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = msg.from.clone() else {
        return Ok(());
    };

    // Tickets are only filed from direct messages; chatter inside support
    // chats is not intake.
    if !msg.chat.is_private() {
        return Ok(());
    }

    // Unrecognized commands fall through the command filter to here.
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            bot.send_message(msg.chat.id, "Unknown command. Use /help for the list of commands.")
                .await?;
            return Ok(());
        }
    }

    let user_id = user.id.0 as i64;
    let username = user.username.clone();
    services.db.users.upsert(user_id, username.as_deref()).await?;

    if let Some(group_id) = msg.media_group_id() {
        let key = group_id.to_string();
        let Some(mut album) = services.albums.collect(&key, msg.clone()).await else {
            // A batch owner is already waiting for this album.
            return Ok(());
        };
        album.sort_by_key(|m| m.id.0);

        let text = album
            .iter()
            .find_map(|m| m.caption())
            .map(str::to_string);
        let media: Vec<NewMediaItem> = album.iter().flat_map(extract_media).collect();

        debug!(user_id = user_id, items = media.len(), "Album batch flushed");
        return submit_ticket(bot, msg.chat.id, user_id, username, text, media, services).await;
    }

    let text = msg.text().or_else(|| msg.caption()).map(str::to_string);
    let media = extract_media(&msg);

    if text.is_none() && media.is_empty() {
        // Unsupported content (sticker, location, ...): nothing to file.
        bot.send_message(msg.chat.id, "Please send text, a photo, a video or an audio message.")
            .await?;
        return Ok(());
    }

    submit_ticket(bot, msg.chat.id, user_id, username, text, media, services).await
}

/// Persist the ticket, acknowledge the submitter once, then broadcast.
async fn submit_ticket(
    bot: Bot,
    origin: ChatId,
    submitter_id: i64,
    submitter_username: Option<String>,
    text: Option<String>,
    media: Vec<NewMediaItem>,
    services: ServiceFactory,
) -> Result<()> {
    let ticket = services
        .ticket_service
        .create(CreateTicketRequest {
            submitter_id,
            submitter_username,
            text,
            media,
        })
        .await?;

    bot.send_message(
        origin,
        format!("Ticket #{} submitted. The genies are on it!", ticket.id),
    )
    .await?;

    let media_rows = services.ticket_service.media_for(ticket.id).await?;
    let outcome = services
        .dispatch_service
        .broadcast(&ticket, &media_rows, false)
        .await?;

    info!(
        ticket_id = ticket.id,
        user_id = submitter_id,
        sent = outcome.sent,
        "New ticket broadcast"
    );
    Ok(())
}

/// Decide the attachment kind once, at ingestion.
fn extract_media(msg: &Message) -> Vec<NewMediaItem> {
    if let Some(best) = msg.photo().and_then(|sizes| sizes.last()) {
        return vec![NewMediaItem {
            kind: MediaKind::Photo,
            file_id: best.file.id.to_string(),
        }];
    }
    if let Some(video) = msg.video() {
        return vec![NewMediaItem {
            kind: MediaKind::Video,
            file_id: video.file.id.to_string(),
        }];
    }
    if let Some(audio) = msg.audio() {
        return vec![NewMediaItem {
            kind: MediaKind::Audio,
            file_id: audio.file.id.to_string(),
        }];
    }
    Vec::new()
}

/// The bot was added to a chat: register it (inactive) and ask the admins
/// whether it should receive tickets.
pub async fn handle_bot_added(
    bot: Bot,
    chat_id: ChatId,
    title: Option<String>,
    services: ServiceFactory,
) -> Result<()> {
    let chat = services
        .db
        .chats
        .register(chat_id.0, title.as_deref())
        .await?;

    info!(chat_id = chat_id.0, title = ?title, "Bot added to chat, awaiting approval");

    let notice = format!(
        "DeskGenie was added to chat: {} (id: {}). Approve ticket publication?",
        chat.display_name(),
        chat.telegram_id
    );

    for admin_id in services.auth_service.admin_notification_targets().await? {
        if let Err(e) = bot
            .send_message(ChatId(admin_id), notice.clone())
            .reply_markup(chat_approval_keyboard(chat.telegram_id))
            .await
        {
            // Admins without an open DM simply miss the notice.
            warn!(admin_id = admin_id, error = %e, "Could not notify admin about new chat");
        }
    }

    Ok(())
}
