//! Mapping of transport-agnostic keyboards onto Telegram inline markup.

use mediavault_core::keyboards::InlineKeyboard;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Convert a keyboard into Telegram reply markup.
#[must_use]
pub fn to_reply_markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.payload.clone()))
            .collect::<Vec<_>>()
    }))
}
