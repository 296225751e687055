//! Error taxonomy shared across the archive.

use thiserror::Error;

/// Convenience result alias used throughout the crate.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that can occur while ingesting, classifying or serving files.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Input rejected before touching the store (empty caption, bad date).
    #[error("{0}")]
    Validation(String),
    /// The subject file record does not exist.
    #[error("file {0} not found")]
    NotFound(i64),
    /// A non-admin attempted a privileged action.
    #[error("permission denied")]
    Permission,
    /// The origin message / file handle tuple is already recorded.
    #[error("already recorded")]
    Conflict,
    /// The underlying record store failed.
    #[error("store error: {0}")]
    Persistence(#[from] sqlx::Error),
    /// An outbound send failed.
    #[error("delivery error: {0}")]
    Delivery(String),
}
