//! User-facing commands: /start, /help, /whoami, /myhistory.

use teloxide::{Bot, prelude::*};
use teloxide::types::Message;
use tracing::info;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::{chunk_lines, ticket_summary_line, MESSAGE_CHUNK_LIMIT};

const WELCOME: &str = "Hi! I'm DeskGenie, the helpdesk bot.\n\n\
Describe your problem in a message (text, photo, video or audio, albums \
work too) and I will file a ticket and pass it to the support genies. \
You will be notified when someone picks it up and when it is resolved.\n\n\
Use /help for the full command list.";

const HELP: &str = "Commands:\n\
/start — introduction\n\
/help — this message\n\
/whoami — your id and role\n\
/myhistory — your submitted tickets\n\n\
Admin commands:\n\
/chats — registered support chats\n\
/tickets — all tickets\n\
/setrole <telegram_id> <user|staff|admin> — change a user's role\n\
/republish — rebroadcast all unclaimed tickets\n\
/republishticket <id> [force] — rebroadcast one ticket";

/// Handle the /start command
pub async fn handle_start(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    if let Some(user) = &msg.from {
        services
            .db
            .users
            .upsert(user.id.0 as i64, user.username.as_deref())
            .await?;
        info!(user_id = user.id.0, "User started the bot");
    }

    bot.send_message(msg.chat.id, WELCOME).await?;
    Ok(())
}

/// Handle the /help command
pub async fn handle_help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, HELP).await?;
    Ok(())
}

/// Handle the /whoami command
pub async fn handle_who_am_i(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = &msg.from else {
        return Ok(());
    };

    let telegram_id = user.id.0 as i64;
    services.db.users.upsert(telegram_id, user.username.as_deref()).await?;
    let role = services.auth_service.role_of(telegram_id).await?;

    bot.send_message(
        msg.chat.id,
        format!("Your id: {}\nYour role: {}", telegram_id, role),
    )
    .await?;
    Ok(())
}

/// Handle the /myhistory command: every ticket the user submitted, newest
/// first, split into chunks under the message size limit.
pub async fn handle_my_history(bot: Bot, msg: Message, services: ServiceFactory) -> Result<()> {
    let Some(user) = &msg.from else {
        return Ok(());
    };

    let tickets = services
        .ticket_service
        .list_for_user(user.id.0 as i64)
        .await?;

    if tickets.is_empty() {
        bot.send_message(msg.chat.id, "You have no tickets yet.").await?;
        return Ok(());
    }

    let lines: Vec<String> = tickets
        .iter()
        .map(|t| ticket_summary_line(t.id, &t.status.to_string(), t.text.as_deref()))
        .collect();

    for chunk in chunk_lines(&lines, MESSAGE_CHUNK_LIMIT) {
        bot.send_message(msg.chat.id, chunk).await?;
    }
    Ok(())
}
