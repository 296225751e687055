//! In-memory [`FileStore`] with the same semantics as the Postgres backend.
//!
//! Used by the test suites and handy for running the bot against no real
//! database.

use super::{check_publish_guard, FileStore, SEARCH_LIMIT};
use crate::error::{ArchiveError, ArchiveResult};
use crate::record::{FileFields, FileRecord, NewFileRecord};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    rows: HashMap<i64, FileRecord>,
    next_id: i64,
}

/// Process-local record store.
#[derive(Default)]
pub struct MemoryFileStore {
    inner: Mutex<Inner>,
}

impl MemoryFileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("file store mutex poisoned")
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn create(&self, draft: NewFileRecord) -> ArchiveResult<FileRecord> {
        let mut inner = self.lock();
        let duplicate = inner.rows.values().any(|r| {
            r.chat_id == draft.chat_id
                && r.message_id == draft.message_id
                && r.handle == draft.handle
        });
        if duplicate {
            return Err(ArchiveError::Conflict);
        }
        inner.next_id += 1;
        let record = FileRecord {
            id: inner.next_id,
            chat_id: draft.chat_id,
            message_id: draft.message_id,
            caption: draft.caption,
            real_filename: draft.real_filename,
            file_type: draft.file_type,
            file_extension: draft.file_extension,
            handle: draft.handle,
            edited: false,
            published: false,
            visible: true,
            uploaded_by: draft.uploaded_by,
            category: None,
            upload_date: None,
            publish_date: None,
            created_at: Utc::now(),
        };
        inner.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: i64, fields: FileFields) -> ArchiveResult<FileRecord> {
        let mut inner = self.lock();
        let current = inner
            .rows
            .get_mut(&id)
            .ok_or(ArchiveError::NotFound(id))?;
        if fields.is_empty() {
            return Ok(current.clone());
        }
        check_publish_guard(current, &fields)?;
        if let Some(v) = fields.caption {
            current.caption = v;
        }
        if let Some(v) = fields.real_filename {
            current.real_filename = Some(v);
        }
        if let Some(v) = fields.edited {
            current.edited = v;
        }
        if let Some(v) = fields.published {
            current.published = v;
        }
        if let Some(v) = fields.visible {
            current.visible = v;
        }
        if let Some(v) = fields.category {
            current.category = Some(v);
        }
        if let Some(v) = fields.upload_date {
            current.upload_date = Some(v);
        }
        if let Some(v) = fields.publish_date {
            current.publish_date = Some(v);
        }
        Ok(current.clone())
    }

    async fn get(&self, id: i64) -> ArchiveResult<Option<FileRecord>> {
        Ok(self.lock().rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> ArchiveResult<()> {
        self.lock().rows.remove(&id);
        Ok(())
    }

    async fn find_by_origin(
        &self,
        chat_id: i64,
        message_id: i64,
        handle: &str,
    ) -> ArchiveResult<Option<FileRecord>> {
        Ok(self
            .lock()
            .rows
            .values()
            .find(|r| r.chat_id == chat_id && r.message_id == message_id && r.handle == handle)
            .cloned())
    }

    async fn search(
        &self,
        substring: &str,
        include_hidden: bool,
    ) -> ArchiveResult<Vec<FileRecord>> {
        let needle = substring.to_lowercase();
        let mut hits: Vec<FileRecord> = self
            .lock()
            .rows
            .values()
            .filter(|r| include_hidden || r.visible)
            .filter(|r| r.caption.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        hits.truncate(SEARCH_LIMIT);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FileType;

    fn draft(message_id: i64, caption: &str) -> NewFileRecord {
        NewFileRecord {
            chat_id: 100,
            message_id,
            caption: caption.to_string(),
            real_filename: None,
            file_type: FileType::Video,
            file_extension: Some("mp4".to_string()),
            handle: format!("handle-{message_id}"),
            uploaded_by: Some(1),
        }
    }

    #[tokio::test]
    async fn duplicate_origin_tuple_is_a_conflict() {
        let store = MemoryFileStore::new();
        store.create(draft(1, "a")).await.expect("first create");
        let err = store.create(draft(1, "a")).await.expect_err("duplicate");
        assert!(matches!(err, ArchiveError::Conflict));

        // same message id but a different handle is a new record
        let mut other = draft(1, "b");
        other.handle = "other".to_string();
        store.create(other).await.expect("distinct handle");
    }

    #[tokio::test]
    async fn publishing_requires_edited() {
        let store = MemoryFileStore::new();
        let record = store.create(draft(1, "a")).await.expect("create");

        let err = store
            .update(
                record.id,
                FileFields {
                    published: Some(true),
                    ..FileFields::default()
                },
            )
            .await
            .expect_err("publish unedited");
        assert!(matches!(err, ArchiveError::Validation(_)));
        let stored = store.get(record.id).await.expect("get").expect("present");
        assert!(!stored.published);

        // publishing together with edited=true in one update is allowed
        let updated = store
            .update(
                record.id,
                FileFields {
                    edited: Some(true),
                    published: Some(true),
                    ..FileFields::default()
                },
            )
            .await
            .expect("publish edited");
        assert!(updated.published);
    }

    #[tokio::test]
    async fn empty_update_is_a_noop() {
        let store = MemoryFileStore::new();
        let record = store.create(draft(1, "a")).await.expect("create");
        let same = store
            .update(record.id, FileFields::default())
            .await
            .expect("noop update");
        assert_eq!(same.caption, record.caption);

        let err = store
            .update(999, FileFields::default())
            .await
            .expect_err("absent id");
        assert!(matches!(err, ArchiveError::NotFound(999)));
    }

    #[tokio::test]
    async fn search_respects_visibility_and_cap() {
        let store = MemoryFileStore::new();
        let visible = store
            .create(draft(1, "Sunday Service"))
            .await
            .expect("create");
        let hidden = store
            .create(draft(2, "Sunday Special"))
            .await
            .expect("create");
        store
            .update(
                hidden.id,
                FileFields {
                    visible: Some(false),
                    ..FileFields::default()
                },
            )
            .await
            .expect("hide");

        let public = store.search("sunday", false).await.expect("search");
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, visible.id);

        let admin = store.search("sunday", true).await.expect("search");
        assert_eq!(admin.len(), 2);

        for i in 0..60 {
            store
                .create(draft(100 + i, "bulk sermon"))
                .await
                .expect("create");
        }
        let capped = store.search("bulk", true).await.expect("search");
        assert_eq!(capped.len(), SEARCH_LIMIT);
    }

    #[tokio::test]
    async fn delete_removes_the_row_only() {
        let store = MemoryFileStore::new();
        let record = store.create(draft(1, "a")).await.expect("create");
        store.delete(record.id).await.expect("delete");
        assert!(store.get(record.id).await.expect("get").is_none());
        store.delete(record.id).await.expect("idempotent delete");
    }

    #[tokio::test]
    async fn find_by_origin_matches_the_full_tuple() {
        let store = MemoryFileStore::new();
        let record = store.create(draft(7, "a")).await.expect("create");
        let found = store
            .find_by_origin(100, 7, "handle-7")
            .await
            .expect("find");
        assert_eq!(found.map(|r| r.id), Some(record.id));
        assert!(store
            .find_by_origin(100, 7, "wrong")
            .await
            .expect("find")
            .is_none());
    }
}
