//! Test doubles shared by the unit and integration suites.

use crate::error::ArchiveResult;
use crate::gateway::{MediaGateway, MediaRef};
use crate::keyboards::InlineKeyboard;
use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// One outbound item captured by the [`RecordingGateway`].
#[derive(Debug, Clone)]
pub enum SentItem {
    /// A re-sent stored file.
    Media {
        /// Destination chat.
        chat_id: i64,
        /// Opaque platform file id.
        handle: String,
        /// Caption on the send.
        caption: String,
    },
    /// A plain text message.
    Text {
        /// Destination chat.
        chat_id: i64,
        /// Message text.
        text: String,
    },
    /// A message with inline buttons.
    Keyboard {
        /// Destination chat.
        chat_id: i64,
        /// Message text.
        text: String,
        /// Attached keyboard.
        keyboard: InlineKeyboard,
    },
    /// A reply prompt.
    Prompt {
        /// Destination chat.
        chat_id: i64,
        /// Prompt text.
        text: String,
        /// Assigned prompt message id.
        prompt_id: i64,
    },
}

/// Gateway that records every send and never fails. Prompt message ids are
/// assigned from 1000 upward.
pub struct RecordingGateway {
    sent: Mutex<Vec<SentItem>>,
    next_prompt_id: AtomicI64,
}

impl RecordingGateway {
    /// Create an empty recording gateway.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_prompt_id: AtomicI64::new(1000),
        }
    }

    /// Snapshot of everything sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentItem> {
        self.sent.lock().expect("gateway mutex poisoned").clone()
    }

    /// Texts of all plain messages sent so far, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|item| match item {
                SentItem::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, item: SentItem) {
        self.sent.lock().expect("gateway mutex poisoned").push(item);
    }
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaGateway for RecordingGateway {
    async fn send_media(&self, chat_id: i64, media: &MediaRef, caption: &str) -> ArchiveResult<()> {
        self.record(SentItem::Media {
            chat_id,
            handle: media.handle.clone(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> ArchiveResult<()> {
        self.record(SentItem::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> ArchiveResult<()> {
        self.record(SentItem::Keyboard {
            chat_id,
            text: text.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn send_prompt(&self, chat_id: i64, text: &str) -> ArchiveResult<i64> {
        let prompt_id = self.next_prompt_id.fetch_add(1, Ordering::SeqCst);
        self.record(SentItem::Prompt {
            chat_id,
            text: text.to_string(),
            prompt_id,
        });
        Ok(prompt_id)
    }
}
