//! [`MediaGateway`] implementation over the Telegram Bot API.

use crate::bot::views;
use async_trait::async_trait;
use mediavault_core::error::{ArchiveError, ArchiveResult};
use mediavault_core::gateway::{MediaGateway, MediaRef};
use mediavault_core::keyboards::InlineKeyboard;
use mediavault_core::record::FileType;
use teloxide::payloads::{SendAudioSetters, SendDocumentSetters, SendMessageSetters, SendVideoSetters};
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile};

/// Sends through a [`Bot`] handle; cheap to clone.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

fn delivery(e: teloxide::RequestError) -> ArchiveError {
    ArchiveError::Delivery(e.to_string())
}

impl TelegramGateway {
    /// Wrap a bot handle.
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MediaGateway for TelegramGateway {
    async fn send_media(&self, chat_id: i64, media: &MediaRef, caption: &str) -> ArchiveResult<()> {
        let chat = ChatId(chat_id);
        let file = InputFile::file_id(FileId(media.handle.clone()));
        match media.file_type {
            FileType::Document => {
                self.bot
                    .send_document(chat, file)
                    .caption(caption)
                    .await
                    .map_err(delivery)?;
            }
            FileType::Video => {
                self.bot
                    .send_video(chat, file)
                    .caption(caption)
                    .await
                    .map_err(delivery)?;
            }
            FileType::Audio => {
                self.bot
                    .send_audio(chat, file)
                    .caption(caption)
                    .await
                    .map_err(delivery)?;
            }
        }
        Ok(())
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> ArchiveResult<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(delivery)?;
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> ArchiveResult<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(views::to_reply_markup(&keyboard))
            .await
            .map_err(delivery)?;
        Ok(())
    }

    async fn send_prompt(&self, chat_id: i64, text: &str) -> ArchiveResult<i64> {
        let message = self
            .bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(delivery)?;
        Ok(i64::from(message.id.0))
    }
}
