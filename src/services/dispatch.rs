//! Broadcast dispatcher
//!
//! Decides where and in what shape a ticket is posted: every active support
//! chat gets one post per ticket, de-duplicated against the publication
//! ledger. Multi-media tickets go out as a single grouped post with the
//! caption on the leading item; single attachments go out as a typed post;
//! text-only tickets as a plain message. A failure in one chat never stops
//! the remaining chats.

use teloxide::{Bot, prelude::*};
use teloxide::types::{
    ChatId, FileId, InputFile, InputMedia, InputMediaPhoto, InputMediaVideo, MessageId, ParseMode,
};
use tracing::{info, warn};
use crate::database::repositories::{ChatRepository, PublicationRepository};
use crate::models::ticket::{MediaKind, Ticket, TicketMedia};
use crate::utils::errors::Result;
use crate::utils::helpers::{claim_keyboard, ticket_caption};

/// Per-broadcast tally reported back to the triggering actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BroadcastOutcome {
    pub fn absorb(&mut self, other: BroadcastOutcome) {
        self.sent += other.sent;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

#[derive(Clone)]
pub struct DispatchService {
    bot: Bot,
    chats: ChatRepository,
    publications: PublicationRepository,
}

impl DispatchService {
    pub fn new(bot: Bot, chats: ChatRepository, publications: PublicationRepository) -> Self {
        Self {
            bot,
            chats,
            publications,
        }
    }

    /// Broadcast a ticket to every active chat. With `force` the ledger
    /// guard is bypassed and already-published chats receive a fresh post;
    /// otherwise re-running the broadcast is a no-op for published chats.
    pub async fn broadcast(&self, ticket: &Ticket, media: &[TicketMedia], force: bool) -> Result<BroadcastOutcome> {
        let targets = self.chats.list_active_ids().await?;
        let mut outcome = BroadcastOutcome::default();

        for chat_id in targets {
            // Any per-chat failure, storage included, is logged and counted;
            // the remaining chats still get their post and this chat stays
            // eligible for a future republish.
            if !force {
                match self.publications.is_published(ticket.id, chat_id).await {
                    Ok(true) => {
                        outcome.skipped += 1;
                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        // Without the guard a send could duplicate; skip
                        // this chat instead.
                        warn!(
                            ticket_id = ticket.id,
                            chat_id = chat_id,
                            error = %e,
                            "Ledger lookup failed, not publishing to chat"
                        );
                        outcome.failed += 1;
                        continue;
                    }
                }
            }

            match self.publish_to_chat(chat_id, ticket, media).await {
                Ok(message_id) => {
                    match self.publications.record(ticket.id, chat_id, message_id.0).await {
                        Ok(_) => outcome.sent += 1,
                        Err(e) => {
                            warn!(
                                ticket_id = ticket.id,
                                chat_id = chat_id,
                                error = %e,
                                "Post sent but ledger write failed"
                            );
                            outcome.failed += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        ticket_id = ticket.id,
                        chat_id = chat_id,
                        error = %e,
                        "Failed to publish ticket to chat"
                    );
                    outcome.failed += 1;
                }
            }
        }

        info!(
            ticket_id = ticket.id,
            sent = outcome.sent,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "Ticket broadcast finished"
        );
        Ok(outcome)
    }

    /// Emit one post representing the ticket and return its message id
    /// (for grouped posts, the id of the leading item).
    async fn publish_to_chat(&self, chat_id: i64, ticket: &Ticket, media: &[TicketMedia]) -> Result<MessageId> {
        let chat = ChatId(chat_id);
        let caption = ticket_caption(
            ticket.id,
            ticket.submitter_id,
            ticket.submitter_username.as_deref(),
            ticket.text.as_deref(),
        );

        if media.len() >= 2 {
            return self.publish_group(chat, ticket, media, &caption).await;
        }

        let message = match media.first() {
            Some(item) => match item.kind {
                MediaKind::Photo => {
                    self.bot
                        .send_photo(chat, InputFile::file_id(FileId(item.file_id.clone())))
                        .caption(caption)
                        .parse_mode(ParseMode::Html)
                        .reply_markup(claim_keyboard(ticket.id))
                        .await?
                }
                MediaKind::Video => {
                    self.bot
                        .send_video(chat, InputFile::file_id(FileId(item.file_id.clone())))
                        .caption(caption)
                        .parse_mode(ParseMode::Html)
                        .reply_markup(claim_keyboard(ticket.id))
                        .await?
                }
                MediaKind::Audio => {
                    self.bot
                        .send_audio(chat, InputFile::file_id(FileId(item.file_id.clone())))
                        .caption(caption)
                        .parse_mode(ParseMode::Html)
                        .reply_markup(claim_keyboard(ticket.id))
                        .await?
                }
            },
            None => {
                self.bot
                    .send_message(chat, caption)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(claim_keyboard(ticket.id))
                    .await?
            }
        };

        Ok(message.id)
    }

    /// Grouped post: photos and videos share one media group, the caption
    /// rides on the first item, and the claim control is attached to the
    /// leading message afterwards (media groups cannot carry a keyboard).
    /// Audio cannot join the group; an all-audio album degrades to a single
    /// audio post.
    async fn publish_group(
        &self,
        chat: ChatId,
        ticket: &Ticket,
        media: &[TicketMedia],
        caption: &str,
    ) -> Result<MessageId> {
        let group = build_media_group(media, caption);

        if group.is_empty() {
            // Only non-groupable attachments; fall back to the first one.
            let first = &media[0];
            let message = self
                .bot
                .send_audio(chat, InputFile::file_id(FileId(first.file_id.clone())))
                .caption(caption.to_string())
                .parse_mode(ParseMode::Html)
                .reply_markup(claim_keyboard(ticket.id))
                .await?;
            return Ok(message.id);
        }

        let messages = self.bot.send_media_group(chat, group).await?;
        let lead_id = messages
            .first()
            .map(|m| m.id)
            .unwrap_or(MessageId(0));

        if let Err(e) = self
            .bot
            .edit_message_reply_markup(chat, lead_id)
            .reply_markup(claim_keyboard(ticket.id))
            .await
        {
            warn!(
                ticket_id = ticket.id,
                chat_id = chat.0,
                error = %e,
                "Could not attach claim keyboard to media group"
            );
        }

        Ok(lead_id)
    }
}

/// Build the platform media group for a multi-attachment ticket. Only
/// photos and videos are groupable; the caption goes on the first item.
pub fn build_media_group(media: &[TicketMedia], caption: &str) -> Vec<InputMedia> {
    let mut group = Vec::new();
    for item in media {
        if !item.kind.groupable() {
            continue;
        }
        let input = InputFile::file_id(FileId(item.file_id.clone()));
        let entry = match item.kind {
            MediaKind::Photo => {
                let mut photo = InputMediaPhoto::new(input);
                if group.is_empty() {
                    photo = photo.caption(caption.to_string()).parse_mode(ParseMode::Html);
                }
                InputMedia::Photo(photo)
            }
            MediaKind::Video => {
                let mut video = InputMediaVideo::new(input);
                if group.is_empty() {
                    video = video.caption(caption.to_string()).parse_mode(ParseMode::Html);
                }
                InputMedia::Video(video)
            }
            MediaKind::Audio => unreachable!("audio is filtered by groupable()"),
        };
        group.push(entry);
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media_item(id: i64, kind: MediaKind) -> TicketMedia {
        TicketMedia {
            id,
            ticket_id: 1,
            kind,
            file_id: format!("file-{}", id),
            position: id as i32,
        }
    }

    #[test]
    fn test_group_caption_only_on_first_item() {
        let media = vec![
            media_item(0, MediaKind::Photo),
            media_item(1, MediaKind::Video),
            media_item(2, MediaKind::Photo),
        ];
        let group = build_media_group(&media, "hello");
        assert_eq!(group.len(), 3);

        let captions: Vec<Option<&str>> = group
            .iter()
            .map(|m| match m {
                InputMedia::Photo(p) => p.caption.as_deref(),
                InputMedia::Video(v) => v.caption.as_deref(),
                _ => None,
            })
            .collect();
        assert_eq!(captions[0], Some("hello"));
        assert_eq!(captions[1], None);
        assert_eq!(captions[2], None);
    }

    #[test]
    fn test_group_skips_audio() {
        let media = vec![
            media_item(0, MediaKind::Audio),
            media_item(1, MediaKind::Photo),
        ];
        let group = build_media_group(&media, "hello");
        assert_eq!(group.len(), 1);
        // Caption moves to the first groupable item.
        match &group[0] {
            InputMedia::Photo(p) => assert_eq!(p.caption.as_deref(), Some("hello")),
            other => panic!("expected photo, got {:?}", other),
        }
    }

    #[test]
    fn test_all_audio_album_yields_empty_group() {
        let media = vec![
            media_item(0, MediaKind::Audio),
            media_item(1, MediaKind::Audio),
        ];
        assert!(build_media_group(&media, "hello").is_empty());
    }

    #[test]
    fn test_outcome_absorb() {
        let mut total = BroadcastOutcome::default();
        total.absorb(BroadcastOutcome { sent: 2, skipped: 1, failed: 0 });
        total.absorb(BroadcastOutcome { sent: 0, skipped: 0, failed: 3 });
        assert_eq!(total, BroadcastOutcome { sent: 2, skipped: 1, failed: 3 });
    }
}
