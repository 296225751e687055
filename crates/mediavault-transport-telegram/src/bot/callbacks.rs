//! Button press handling.

use anyhow::Result;
use mediavault_core::dispatch::{ButtonPress, CallbackDispatcher};
use std::sync::Arc;
use teloxide::payloads::AnswerCallbackQuerySetters;
use teloxide::prelude::*;

/// Handle one inbound callback query and acknowledge it. Presses without a
/// payload are acknowledged silently.
///
/// # Errors
///
/// Returns an error if answering the query fails.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dispatcher: Arc<CallbackDispatcher>,
) -> Result<()> {
    let Some(payload) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    // rare: the button's message may be unavailable, fall back to the presser
    let chat_id = q
        .message
        .as_ref()
        .map_or(q.from.id.0.cast_signed(), |m| m.chat().id.0);
    let press = ButtonPress {
        from_id: q.from.id.0.cast_signed(),
        chat_id,
        payload,
    };
    let ack = dispatcher.dispatch(&press).await;
    let mut answer = bot.answer_callback_query(q.id);
    if !ack.is_empty() {
        answer = answer.text(ack);
    }
    answer.await?;
    Ok(())
}
