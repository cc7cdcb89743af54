//! Durable record of completed items
//!
//! [`CompletionSet`] answers "has this item already been handled?" across
//! process restarts. Membership lives in a [`Store`] set, which is the only
//! read path. Every recorded completion is also appended to the
//! [`ArchiveLog`]. The two writes are not transactional: the store write
//! decides success and a failed log append only produces a warning.

use crate::archive::ArchiveLog;
use crate::error::Result;
use crate::store::Store;
use crate::types::ItemId;
use std::sync::Arc;

/// Set of item ids whose work is done
#[derive(Clone)]
pub struct CompletionSet {
    store: Arc<dyn Store>,
    set_key: String,
    archive: ArchiveLog,
}

impl CompletionSet {
    /// Create a completion set stored under `set_key`
    pub fn new(store: Arc<dyn Store>, set_key: impl Into<String>, archive: ArchiveLog) -> Self {
        Self {
            store,
            set_key: set_key.into(),
            archive,
        }
    }

    /// Check whether `id` has been recorded as complete
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` when the store cannot be queried. Callers
    /// should then assume the item is *not* complete.
    pub async fn contains(&self, id: &ItemId) -> Result<bool> {
        self.store.set_contains(&self.set_key, id.as_str()).await
    }

    /// Record `id` as complete
    ///
    /// Adding an id twice leaves membership unchanged, though each call
    /// appends another archive line.
    pub async fn mark_complete(&self, id: &ItemId, source_tag: &str) -> Result<()> {
        self.store.set_add(&self.set_key, id.as_str()).await?;

        if let Err(e) = self.archive.append(source_tag, id.as_str()).await {
            tracing::warn!(
                id = %id,
                archive = %self.archive.path().display(),
                error = %e,
                "Recorded completion but failed to append to archive log"
            );
        }

        Ok(())
    }

    /// Name of the backing store set
    pub fn set_key(&self) -> &str {
        &self.set_key
    }
}
