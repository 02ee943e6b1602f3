//! Shared helper functions
//!
//! Message formatting used by the dispatcher, handlers and notifications.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;

/// Telegram hard limit is 4096; keep headroom for the final line.
pub const MESSAGE_CHUNK_LIMIT: usize = 4000;

/// Build an HTML link to a user, preferring the @username form.
pub fn user_link(telegram_id: i64, username: Option<&str>) -> String {
    match username {
        Some(name) if !name.is_empty() => format!("@{}", html::escape(name)),
        _ => format!("<a href=\"tg://user?id={0}\">{0}</a>", telegram_id),
    }
}

/// Caption attached to every broadcast ticket post.
pub fn ticket_caption(
    ticket_id: i64,
    submitter_id: i64,
    submitter_username: Option<&str>,
    text: Option<&str>,
) -> String {
    let body = match text {
        Some(t) if !t.is_empty() => html::escape(t),
        _ => "(no text)".to_string(),
    };
    format!(
        "New ticket #{}\nFrom: {}\n\n{}",
        ticket_id,
        user_link(submitter_id, submitter_username),
        body
    )
}

/// Short one-line summary used in history listings.
pub fn ticket_summary_line(ticket_id: i64, status: &str, text: Option<&str>) -> String {
    let snippet = match text {
        Some(t) if t.chars().count() > 50 => {
            let cut: String = t.chars().take(50).collect();
            format!("{}...", cut)
        }
        Some(t) if !t.is_empty() => t.to_string(),
        _ => String::new(),
    };
    format!("#{} [{}] — {}", ticket_id, status, snippet)
}

/// Split lines into messages that stay under the Telegram size limit.
pub fn chunk_lines(lines: &[String], limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in lines {
        if !current.is_empty() && current.len() + line.len() + 1 > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Inline keyboard with a single claim control.
pub fn claim_keyboard(ticket_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Claim",
        format!("claim:{}", ticket_id),
    )]])
}

/// Inline keyboard with a single resolve control, sent to the claimer.
pub fn resolve_keyboard(ticket_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Resolve",
        format!("resolve:{}", ticket_id),
    )]])
}

/// Approve/decline controls attached to the admin notification when the
/// bot joins a new chat.
pub fn chat_approval_keyboard(chat_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Approve", format!("chat:approve:{}", chat_id)),
        InlineKeyboardButton::callback("🚫 Decline", format!("chat:decline:{}", chat_id)),
    ]])
}

/// One activation-toggle button per registered chat in the /chats listing.
pub fn chat_toggle_button(chat_id: i64, display_name: &str, is_active: bool) -> InlineKeyboardButton {
    if is_active {
        InlineKeyboardButton::callback(
            format!("Deactivate {}", display_name),
            format!("chat:deactivate:{}", chat_id),
        )
    } else {
        InlineKeyboardButton::callback(
            format!("Activate {}", display_name),
            format!("chat:activate:{}", chat_id),
        )
    }
}
