//! Handlers module
//!
//! Telegram update handlers wired into the dispatcher in `main.rs`.

pub mod callbacks;
pub mod commands;
pub mod messages;

use teloxide::Bot;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use crate::utils::errors::Result;

/// Turn user-facing failures into a reply instead of a dispatcher error.
/// Internal failures still propagate for logging.
pub async fn reply_user_errors(bot: &Bot, chat_id: ChatId, result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_user_facing() => {
            bot.send_message(chat_id, e.user_message()).await?;
            Ok(())
        }
        other => other,
    }
}
