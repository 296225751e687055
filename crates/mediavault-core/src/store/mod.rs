//! Record store seam: the [`FileStore`] trait plus Postgres and in-memory
//! backends with identical semantics.

mod memory;
mod postgres;

pub use memory::MemoryFileStore;
pub use postgres::PgFileStore;

use crate::error::{ArchiveError, ArchiveResult};
use crate::record::{FileFields, FileRecord, NewFileRecord};
use async_trait::async_trait;

/// Maximum number of rows a caption search returns.
pub const SEARCH_LIMIT: usize = 50;

/// CRUD plus caption search over [`FileRecord`]s.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// Fails with [`ArchiveError::Conflict`] when the (chat, message, handle)
    /// tuple is already recorded.
    async fn create(&self, draft: NewFileRecord) -> ArchiveResult<FileRecord>;

    /// Apply the given fields to a record and return the updated row. An
    /// empty field set is a no-op returning the current row.
    ///
    /// # Errors
    ///
    /// Fails with [`ArchiveError::NotFound`] when the id is absent and with
    /// [`ArchiveError::Validation`] when the update would publish a record
    /// that is not marked edited.
    async fn update(&self, id: i64, fields: FileFields) -> ArchiveResult<FileRecord>;

    /// Fetch a record by id.
    async fn get(&self, id: i64) -> ArchiveResult<Option<FileRecord>>;

    /// Hard-delete the record. The platform copy of the file is untouched.
    async fn delete(&self, id: i64) -> ArchiveResult<()>;

    /// Locate a record by its origin message and file handle.
    async fn find_by_origin(
        &self,
        chat_id: i64,
        message_id: i64,
        handle: &str,
    ) -> ArchiveResult<Option<FileRecord>>;

    /// Case-insensitive caption substring search, newest first, capped at
    /// [`SEARCH_LIMIT`]. Rows with `visible = false` are excluded unless
    /// `include_hidden`.
    async fn search(&self, substring: &str, include_hidden: bool) -> ArchiveResult<Vec<FileRecord>>;
}

/// A stored `published` flag may only be raised on an edited record.
pub(crate) fn check_publish_guard(
    current: &FileRecord,
    fields: &FileFields,
) -> ArchiveResult<()> {
    if fields.published == Some(true) {
        let edited = fields.edited.unwrap_or(current.edited);
        if !edited {
            return Err(ArchiveError::Validation(
                "cannot publish a file that is not marked edited".to_string(),
            ));
        }
    }
    Ok(())
}
