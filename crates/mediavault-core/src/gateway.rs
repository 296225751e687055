//! Outbound send operations, abstracted away from the transport.

use crate::error::ArchiveResult;
use crate::keyboards::InlineKeyboard;
use crate::record::{FileRecord, FileType};
use async_trait::async_trait;

/// Reference to a file stored on the messaging platform.
#[derive(Debug, Clone)]
pub struct MediaRef {
    /// Kind of media, deciding the send operation to use.
    pub file_type: FileType,
    /// Opaque platform file id.
    pub handle: String,
}

impl MediaRef {
    /// The media reference stored on a record.
    #[must_use]
    pub fn of(record: &FileRecord) -> Self {
        Self {
            file_type: record.file_type,
            handle: record.handle.clone(),
        }
    }
}

/// Outbound delivery operations used by the classification flow.
///
/// Every method is a potential suspension point; none is retried
/// automatically.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Re-send a stored file to a chat with the given caption.
    async fn send_media(&self, chat_id: i64, media: &MediaRef, caption: &str) -> ArchiveResult<()>;
    /// Send a plain text message.
    async fn send_text(&self, chat_id: i64, text: &str) -> ArchiveResult<()>;
    /// Send a message with inline buttons.
    async fn send_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> ArchiveResult<()>;
    /// Send a question whose answer arrives as a reply to it; returns the id
    /// of the prompt message for reply correlation.
    async fn send_prompt(&self, chat_id: i64, text: &str) -> ArchiveResult<i64>;
}
