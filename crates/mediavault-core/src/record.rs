//! The persisted file record and the media payload it is created from.

use crate::error::ArchiveError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of media a record describes. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// A generic document attachment.
    Document,
    /// A video file.
    Video,
    /// An audio file.
    Audio,
}

impl FileType {
    /// Stable lowercase name, also the stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(Self::Document),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(ArchiveError::Validation(format!(
                "unknown file type: {other}"
            ))),
        }
    }
}

/// Classification category chosen during the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Sermon recordings.
    Sermon,
    /// Prophecy recordings.
    Prophecy,
}

impl Category {
    /// Stable lowercase name, also the stored column value and wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sermon => "sermon",
            Self::Prophecy => "prophecy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sermon" => Ok(Self::Sermon),
            "prophecy" => Ok(Self::Prophecy),
            other => Err(ArchiveError::Validation(format!(
                "unknown category: {other}"
            ))),
        }
    }
}

/// The durable entity describing one archived file.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Generated primary identity.
    pub id: i64,
    /// Chat the file was originally posted to.
    pub chat_id: i64,
    /// Message id of the original post.
    pub message_id: i64,
    /// Display title. Non-empty, mutable.
    pub caption: String,
    /// Original filename, if any.
    pub real_filename: Option<String>,
    /// Kind of media. Immutable after creation.
    pub file_type: FileType,
    /// Extension derived from the original filename.
    pub file_extension: Option<String>,
    /// Opaque platform file id used to re-send without re-uploading.
    pub handle: String,
    /// Whether the file is the edited cut.
    pub edited: bool,
    /// Whether the file has been published. Only legal while `edited`.
    pub published: bool,
    /// Whether the file shows up in non-admin searches.
    pub visible: bool,
    /// Identity of the uploader.
    pub uploaded_by: Option<i64>,
    /// Classification category. `None` until classified.
    pub category: Option<Category>,
    /// Upload date collected through the day/month/year dialogue.
    pub upload_date: Option<NaiveDate>,
    /// Scheduled publish date, if any.
    pub publish_date: Option<NaiveDateTime>,
    /// Creation timestamp, generated by the store.
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Multi-line summary shown above the admin edit menu.
    #[must_use]
    pub fn summary(&self) -> String {
        self.summary_with("File details:")
    }

    /// Summary with a caller-chosen header line.
    #[must_use]
    pub fn summary_with(&self, header: &str) -> String {
        format!(
            "{header}\n\n\
             Title: {}\n\
             Type: {}\n\
             Category: {}\n\
             Edited: {}\n\
             Published: {}\n\
             Visible: {}\n\
             Filename: {}\n\
             Uploaded by: {}\n\
             Stored id: {}",
            self.caption,
            self.file_type,
            self.category
                .map_or_else(|| "(not set)".to_string(), |c| c.to_string()),
            self.edited,
            self.published,
            self.visible,
            self.real_filename.as_deref().unwrap_or("(none)"),
            self.uploaded_by
                .map_or_else(|| "(unknown)".to_string(), |u| u.to_string()),
            self.id,
        )
    }
}

/// Draft used to create a record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Chat the file was posted to.
    pub chat_id: i64,
    /// Message id of the post.
    pub message_id: i64,
    /// Validated, non-empty caption.
    pub caption: String,
    /// Original filename or the caption for non-documents.
    pub real_filename: Option<String>,
    /// Kind of media.
    pub file_type: FileType,
    /// Extension derived from the original filename.
    pub file_extension: Option<String>,
    /// Opaque platform file id.
    pub handle: String,
    /// Identity of the uploader.
    pub uploaded_by: Option<i64>,
}

/// Field-by-field update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct FileFields {
    /// New caption.
    pub caption: Option<String>,
    /// New real filename.
    pub real_filename: Option<String>,
    /// New edited flag.
    pub edited: Option<bool>,
    /// New published flag. Setting `true` requires the record to be edited.
    pub published: Option<bool>,
    /// New visibility flag.
    pub visible: Option<bool>,
    /// New category.
    pub category: Option<Category>,
    /// New upload date.
    pub upload_date: Option<NaiveDate>,
    /// New publish date.
    pub publish_date: Option<NaiveDateTime>,
}

impl FileFields {
    /// True when no field would change; updates with empty field sets are a
    /// no-op.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.caption.is_none()
            && self.real_filename.is_none()
            && self.edited.is_none()
            && self.published.is_none()
            && self.visible.is_none()
            && self.category.is_none()
            && self.upload_date.is_none()
            && self.publish_date.is_none()
    }
}

/// Media attachment extracted from an inbound message.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    /// Kind of media.
    pub file_type: FileType,
    /// Opaque platform file id.
    pub handle: String,
    /// Original filename reported by the platform, if any.
    pub file_name: Option<String>,
}

impl MediaInfo {
    /// Display name, falling back to a per-type synthetic name.
    #[must_use]
    pub fn display_name(&self, message_id: i64) -> String {
        if let Some(name) = &self.file_name {
            return name.clone();
        }
        match self.file_type {
            FileType::Document => "untitled".to_string(),
            FileType::Video => format!("video-{message_id}"),
            FileType::Audio => format!("audio-{message_id}"),
        }
    }

    /// Lowercased extension of the original filename, with per-type defaults
    /// when the name carries none.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        if let Some((_, ext)) = self.file_name.as_deref().and_then(|n| n.rsplit_once('.')) {
            return Some(ext.to_lowercase());
        }
        match self.file_type {
            FileType::Document => None,
            FileType::Video => Some("mp4".to_string()),
            FileType::Audio => Some("m4a".to_string()),
        }
    }
}

/// A media message as received from the transport layer.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Chat the media was posted to.
    pub chat_id: i64,
    /// Message id of the post.
    pub message_id: i64,
    /// Identity of the sender, when known.
    pub sender_id: Option<i64>,
    /// Caption attached to the post, if any.
    pub caption: Option<String>,
    /// The attached media.
    pub media: MediaInfo,
}

impl MediaUpload {
    /// Build the insert draft for this upload, given a validated caption.
    #[must_use]
    pub fn into_draft(self, caption: String) -> NewFileRecord {
        let real_filename = match self.media.file_type {
            FileType::Document => Some(
                self.media
                    .file_name
                    .clone()
                    .unwrap_or_else(|| caption.clone()),
            ),
            FileType::Video | FileType::Audio => Some(caption.clone()),
        };
        NewFileRecord {
            chat_id: self.chat_id,
            message_id: self.message_id,
            caption,
            real_filename,
            file_type: self.media.file_type,
            file_extension: self.media.extension(),
            handle: self.media.handle,
            uploaded_by: self.sender_id,
        }
    }
}
