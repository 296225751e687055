//! Ephemeral correlation of prompt messages and partially collected dates.
//!
//! Both maps are process-local and carry a TTL so abandoned dialogues are
//! reclaimed. A restart drops all pending prompts, silently abandoning any
//! in-flight classification sequence.

use crate::record::MediaUpload;
use moka::sync::Cache;
use std::time::Duration;

/// Time-to-live for pending prompt entries.
const PROMPT_TTL_SECS: u64 = 24 * 60 * 60;
/// Time-to-live for partial day/month selections.
const PARTIAL_TTL_SECS: u64 = 24 * 60 * 60;
/// Maximum number of tracked entries per map.
const TRACKER_CAPACITY: u64 = 10_000;

/// The operation that should run when the reply to a prompt message arrives.
#[derive(Debug, Clone)]
pub enum PendingPrompt {
    /// Waiting for the caption of a file that has not been recorded yet.
    Caption(MediaUpload),
    /// Waiting for a new caption/filename for an existing record.
    Rename {
        /// Subject record id.
        file_id: i64,
    },
    /// Waiting for a `YYYY-MM-DD HH:MM` publish date for an existing record.
    SchedulePublish {
        /// Subject record id.
        file_id: i64,
    },
}

/// Day/month selections collected before the year is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialDate {
    /// Selected day of month, if any.
    pub day: Option<u32>,
    /// Selected month, if any.
    pub month: Option<u32>,
}

/// Tracks prompt messages awaiting replies and per-file partial dates.
pub struct PromptTracker {
    prompts: Cache<i64, PendingPrompt>,
    partials: Cache<i64, PartialDate>,
}

impl PromptTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prompts: Cache::builder()
                .max_capacity(TRACKER_CAPACITY)
                .time_to_live(Duration::from_secs(PROMPT_TTL_SECS))
                .build(),
            partials: Cache::builder()
                .max_capacity(TRACKER_CAPACITY)
                .time_to_live(Duration::from_secs(PARTIAL_TTL_SECS))
                .build(),
        }
    }

    /// Register a pending operation under a prompt message id. Registering a
    /// second operation under the same id overwrites the first.
    pub fn register(&self, prompt_id: i64, pending: PendingPrompt) {
        self.prompts.insert(prompt_id, pending);
    }

    /// Take the pending operation for a prompt message, if any. Consumed
    /// exactly once.
    pub fn consume(&self, prompt_id: i64) -> Option<PendingPrompt> {
        self.prompts.remove(&prompt_id)
    }

    /// Current partial date state for a record.
    #[must_use]
    pub fn peek_partial(&self, file_id: i64) -> PartialDate {
        self.partials.get(&file_id).unwrap_or_default()
    }

    /// Replace the partial date state for a record.
    pub fn set_partial(&self, file_id: i64, partial: PartialDate) {
        self.partials.insert(file_id, partial);
    }

    /// Drop the partial date state for a record.
    pub fn clear_partial(&self, file_id: i64) {
        self.partials.invalidate(&file_id);
    }
}

impl Default for PromptTracker {
    fn default() -> Self {
        Self::new()
    }
}
