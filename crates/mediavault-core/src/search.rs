//! Caption search surfaced as a result keyboard.

use crate::callback::CallbackAction;
use crate::error::ArchiveResult;
use crate::store::FileStore;
use crate::utils::truncate_label;
use std::sync::Arc;

/// Maximum characters of a caption shown on a result button.
const LABEL_LIMIT: usize = 50;

/// One search result button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Caption, truncated for button display.
    pub label: String,
    /// `get|<id>` payload fetching the file.
    pub payload: String,
}

/// Outcome of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The query was empty after trimming; nothing to do.
    EmptyQuery,
    /// No record matched.
    NoMatches,
    /// Matching records, newest first.
    Hits(Vec<SearchHit>),
}

/// Read-only search facade over the record store.
pub struct SearchIndex {
    store: Arc<dyn FileStore>,
}

impl SearchIndex {
    /// Build the index over a store.
    #[must_use]
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }

    /// Run a caption substring query. Hidden records are included only for
    /// admins.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn query(&self, raw: &str, include_hidden: bool) -> ArchiveResult<SearchOutcome> {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(SearchOutcome::EmptyQuery);
        }
        let records = self.store.search(&needle, include_hidden).await?;
        if records.is_empty() {
            return Ok(SearchOutcome::NoMatches);
        }
        let hits = records
            .into_iter()
            .map(|r| SearchHit {
                label: truncate_label(&r.caption, LABEL_LIMIT),
                payload: CallbackAction::Get { file_id: r.id }.encode(),
            })
            .collect();
        Ok(SearchOutcome::Hits(hits))
    }
}
