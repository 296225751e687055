//! Message handlers: commands, media uploads, prompt replies and search.

use anyhow::Result;
use mediavault_core::classify::ClassificationFlow;
use mediavault_core::dispatch::CallbackDispatcher;
use mediavault_core::keyboards::{InlineButton, InlineKeyboard};
use mediavault_core::record::{FileType, MediaInfo, MediaUpload};
use mediavault_core::search::{SearchIndex, SearchOutcome};
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::{error, info};

use crate::bot::views;

/// Supported commands for the bot
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Start the bot and show welcome message
    #[command(description = "Start the bot.")]
    Start,
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Extract the media attachment of a message, if any.
#[must_use]
pub fn extract_media(msg: &Message) -> Option<MediaInfo> {
    if let Some(document) = msg.document() {
        return Some(MediaInfo {
            file_type: FileType::Document,
            handle: document.file.id.0.clone(),
            file_name: document.file_name.clone(),
        });
    }
    if let Some(video) = msg.video() {
        return Some(MediaInfo {
            file_type: FileType::Video,
            handle: video.file.id.0.clone(),
            file_name: video.file_name.clone(),
        });
    }
    if let Some(audio) = msg.audio() {
        return Some(MediaInfo {
            file_type: FileType::Audio,
            handle: audio.file.id.0.clone(),
            file_name: audio.file_name.clone(),
        });
    }
    None
}

/// Handle the `/start` command.
///
/// # Errors
///
/// Returns an error if sending the welcome message fails.
pub async fn start(
    bot: Bot,
    msg: Message,
    dispatcher: Arc<CallbackDispatcher>,
) -> Result<()> {
    let welcome = if dispatcher.is_admin(get_user_id_safe(&msg)) {
        "🎉 Welcome Admin. Send media to save, classify, and search files."
    } else {
        "🎉 Welcome. You can search files here; uploading is for admins only."
    };
    bot.send_message(msg.chat.id, welcome).await?;
    Ok(())
}

/// Handle an inbound media message. Uploading is restricted to admins;
/// everyone else is pointed at search.
///
/// # Errors
///
/// Returns an error if sending feedback fails.
pub async fn handle_media(
    bot: Bot,
    msg: Message,
    flow: Arc<ClassificationFlow>,
    dispatcher: Arc<CallbackDispatcher>,
) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    if !dispatcher.is_admin(user_id) {
        bot.send_message(
            msg.chat.id,
            "❌ Only bot admins can save files. You may search files though.",
        )
        .await?;
        return Ok(());
    }
    let Some(media) = extract_media(&msg) else {
        return Ok(());
    };
    let upload = MediaUpload {
        chat_id: msg.chat.id.0,
        message_id: i64::from(msg.id.0),
        sender_id: (user_id != 0).then_some(user_id),
        caption: msg.caption().map(ToString::to_string),
        media,
    };
    if let Err(e) = flow.ingest(upload).await {
        error!("Media ingest failed: {e}");
        bot.send_message(msg.chat.id, "❌ Failed to save file. Try again.")
            .await?;
    }
    Ok(())
}

/// Handle a text reply: first as an answer to a pending prompt, then, for
/// admins, as a lookup of the replied-to media message in the archive.
/// Returns `false` when neither applies, so replies to unrelated messages
/// can fall through to search.
///
/// # Errors
///
/// Returns an error if sending feedback fails.
pub async fn handle_reply(
    bot: Bot,
    msg: Message,
    flow: Arc<ClassificationFlow>,
    dispatcher: Arc<CallbackDispatcher>,
) -> Result<bool> {
    let (Some(replied), Some(text)) = (msg.reply_to_message(), msg.text()) else {
        return Ok(false);
    };
    let chat_id = msg.chat.id.0;
    let prompt_id = i64::from(replied.id.0);
    match flow.handle_prompt_reply(prompt_id, chat_id, text).await {
        Ok(true) => return Ok(true),
        Ok(false) => {}
        Err(e) => {
            error!("Prompt reply failed: {e}");
            bot.send_message(msg.chat.id, "❌ Failed to process the reply. Try again.")
                .await?;
            return Ok(true);
        }
    }
    if dispatcher.is_admin(get_user_id_safe(&msg)) {
        if let Some(media) = extract_media(replied) {
            let found = flow
                .show_record_for_origin(
                    chat_id,
                    replied.chat.id.0,
                    i64::from(replied.id.0),
                    &media.handle,
                )
                .await?;
            if found {
                info!("Opened edit entry for message {}", replied.id.0);
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Handle a private text message as a caption search.
///
/// # Errors
///
/// Returns an error if the search or sending results fails.
pub async fn handle_search(
    bot: Bot,
    msg: Message,
    search: Arc<SearchIndex>,
    dispatcher: Arc<CallbackDispatcher>,
) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let include_hidden = dispatcher.is_admin(get_user_id_safe(&msg));
    match search.query(text, include_hidden).await? {
        SearchOutcome::EmptyQuery => {}
        SearchOutcome::NoMatches => {
            bot.send_message(msg.chat.id, format!("❌ No files found matching \"{text}\"."))
                .await?;
        }
        SearchOutcome::Hits(hits) => {
            let keyboard: InlineKeyboard = hits
                .into_iter()
                .map(|hit| vec![InlineButton::new(hit.label, hit.payload)])
                .collect();
            bot.send_message(msg.chat.id, format!("🔎 Search results for \"{text}\":"))
                .reply_markup(views::to_reply_markup(&keyboard))
                .await?;
        }
    }
    Ok(())
}
