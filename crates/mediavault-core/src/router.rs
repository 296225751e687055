//! Distribution routing decision table.

use crate::record::{Category, FileRecord, FileType};

/// Fixed set of distribution group chats, injected from configuration.
#[derive(Debug, Clone, Copy)]
pub struct RoutingTable {
    /// Group receiving edited sermon videos.
    pub edited_sermon_video: i64,
    /// Group receiving unedited sermon videos.
    pub unedited_sermon_video: i64,
    /// Group receiving edited prophecy videos.
    pub edited_prophecy_video: i64,
    /// Group receiving unedited prophecy videos.
    pub unedited_prophecy_video: i64,
    /// Group receiving all audio files.
    pub sermon_audio: i64,
}

/// Pure decision table mapping a classified record to a distribution chat.
#[derive(Debug, Clone, Copy)]
pub struct DistributionRouter {
    table: RoutingTable,
}

impl DistributionRouter {
    /// Build a router over the given table.
    #[must_use]
    pub const fn new(table: RoutingTable) -> Self {
        Self { table }
    }

    /// Pick the distribution chat for a record, or `None` when the storage
    /// channel copy is all the record gets (documents).
    #[must_use]
    pub fn route(&self, record: &FileRecord) -> Option<i64> {
        let t = &self.table;
        match record.file_type {
            FileType::Video => Some(match record.category {
                Some(Category::Sermon) => {
                    if record.edited {
                        t.edited_sermon_video
                    } else {
                        t.unedited_sermon_video
                    }
                }
                Some(Category::Prophecy) => {
                    if record.edited {
                        t.edited_prophecy_video
                    } else {
                        t.unedited_prophecy_video
                    }
                }
                // unclassified videos fall back to the edited sermon group
                None => t.edited_sermon_video,
            }),
            FileType::Audio => Some(t.sermon_audio),
            FileType::Document => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const TABLE: RoutingTable = RoutingTable {
        edited_sermon_video: -101,
        unedited_sermon_video: -102,
        edited_prophecy_video: -103,
        unedited_prophecy_video: -104,
        sermon_audio: -105,
    };

    fn record(file_type: FileType, category: Option<Category>, edited: bool) -> FileRecord {
        FileRecord {
            id: 1,
            chat_id: 1,
            message_id: 1,
            caption: "t".to_string(),
            real_filename: None,
            file_type,
            file_extension: None,
            handle: "h".to_string(),
            edited,
            published: false,
            visible: true,
            uploaded_by: None,
            category,
            upload_date: None,
            publish_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn decision_table_is_deterministic() {
        use Category::{Prophecy, Sermon};
        use FileType::{Audio, Document, Video};

        let cases: [(FileType, Option<Category>, bool, Option<i64>); 12] = [
            (Video, Some(Sermon), true, Some(-101)),
            (Video, Some(Sermon), false, Some(-102)),
            (Video, Some(Prophecy), true, Some(-103)),
            (Video, Some(Prophecy), false, Some(-104)),
            (Video, None, true, Some(-101)),
            (Video, None, false, Some(-101)),
            (Audio, Some(Sermon), true, Some(-105)),
            (Audio, Some(Prophecy), false, Some(-105)),
            (Audio, None, false, Some(-105)),
            (Document, Some(Sermon), true, None),
            (Document, Some(Prophecy), false, None),
            (Document, None, false, None),
        ];

        let router = DistributionRouter::new(TABLE);
        for (file_type, category, edited, expected) in cases {
            assert_eq!(
                router.route(&record(file_type, category, edited)),
                expected,
                "({file_type:?}, {category:?}, edited={edited})"
            );
        }
    }

    #[test]
    fn routing_ignores_call_order() {
        let router = DistributionRouter::new(TABLE);
        let audio = record(FileType::Audio, None, false);
        let video = record(FileType::Video, Some(Category::Sermon), true);
        assert_eq!(router.route(&audio), Some(-105));
        assert_eq!(router.route(&video), Some(-101));
        assert_eq!(router.route(&audio), Some(-105));
    }
}
