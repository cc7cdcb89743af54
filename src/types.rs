//! Core types for playlist-dl

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a media item
///
/// Assigned by upstream resolution and used as the sole key for completion
/// tracking. Never derived from mutable fields such as the title.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new ItemId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw metadata as produced by the fetcher's extraction step
///
/// Either a single item or a collection with an `entries` array. Stored
/// verbatim in the metadata cache.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMetadata(pub serde_json::Value);

impl RawMetadata {
    /// Wrap a JSON value
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON value
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// One logical media item
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Stable identifier; `None` marks a malformed item
    pub id: Option<ItemId>,
    /// Display name used for path templating
    pub title: String,
    /// Title of the collection this item belongs to
    pub collection_title: Option<String>,
    /// Page URL of this specific item
    pub url: Option<String>,
    /// Container extension reported by the metadata
    pub ext: Option<String>,
    /// Extractor that produced the metadata (e.g. "Youtube")
    pub extractor: Option<String>,
}

impl ItemDescriptor {
    /// Tag written in front of the id in the archive log
    ///
    /// Lowercased extractor key, falling back to `default` when unknown.
    pub fn source_tag<'a>(&'a self, default: &'a str) -> std::borrow::Cow<'a, str> {
        match self.extractor.as_deref() {
            Some(extractor) if !extractor.is_empty() => extractor.to_lowercase().into(),
            _ => default.into(),
        }
    }

    /// Label for log lines: the id when present, otherwise the title
    pub fn label(&self) -> &str {
        self.id.as_ref().map_or(self.title.as_str(), ItemId::as_str)
    }
}

/// Ordered group of items sharing a title context
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Display name of the collection
    pub title: String,
    /// Items in resolution order
    pub items: Vec<ItemDescriptor>,
}

impl Collection {
    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Terminal outcome of processing one item
///
/// Items start out undecided; the completion gate moves each one into
/// exactly one of these states per run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ItemOutcome {
    /// Already recorded as completed
    Skipped,
    /// Artifact found on disk and recorded retroactively
    AlreadyLocal,
    /// Retrieved and recorded
    Fetched,
    /// Malformed item or failed fetch; nothing recorded
    Failed {
        /// Why the item failed
        reason: String,
    },
}

impl ItemOutcome {
    /// Short lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemOutcome::Skipped => "skipped",
            ItemOutcome::AlreadyLocal => "already-local",
            ItemOutcome::Fetched => "fetched",
            ItemOutcome::Failed { .. } => "failed",
        }
    }

    /// Whether the item is durably complete after this outcome
    pub fn is_complete(&self) -> bool {
        !matches!(self, ItemOutcome::Failed { .. })
    }
}

/// Outcome of one item together with its identity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReport {
    /// Item identifier, if it had one
    pub id: Option<ItemId>,
    /// Item title
    pub title: String,
    /// Terminal outcome
    pub outcome: ItemOutcome,
}

/// Aggregated result of one run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Title of the resolved collection
    pub collection_title: String,
    /// Per-item reports in processing order
    pub items: Vec<ItemReport>,
    /// Items skipped as already completed
    pub skipped: usize,
    /// Items found on disk and recorded
    pub already_local: usize,
    /// Items retrieved
    pub fetched: usize,
    /// Items that failed
    pub failed: usize,
    /// Items left undecided because the run was interrupted
    pub pending: usize,
    /// Whether the run stopped before processing every item
    pub interrupted: bool,
}

impl RunSummary {
    /// Start an empty summary for a collection
    pub fn new(collection_title: impl Into<String>) -> Self {
        Self {
            collection_title: collection_title.into(),
            ..Default::default()
        }
    }

    /// Record one item's terminal outcome
    pub fn record(&mut self, item: &ItemDescriptor, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::AlreadyLocal => self.already_local += 1,
            ItemOutcome::Fetched => self.fetched += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(ItemReport {
            id: item.id.clone(),
            title: item.title.clone(),
            outcome,
        });
    }

    /// Number of items processed
    pub fn total(&self) -> usize {
        self.items.len()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} items, {} fetched, {} already local, {} skipped, {} failed",
            self.collection_title,
            self.total(),
            self.fetched,
            self.already_local,
            self.skipped,
            self.failed
        )?;
        if self.interrupted {
            write!(f, " (interrupted, {} pending)", self.pending)?;
        }
        Ok(())
    }
}

/// Event emitted by the downloader
///
/// Subscribe via [`crate::PlaylistDownloader::subscribe`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// URL resolved into a collection
    Resolved {
        /// The URL that was resolved
        url: String,
        /// Collection title
        title: String,
        /// Number of items in the collection
        items: usize,
        /// Whether the metadata came from the cache
        from_cache: bool,
    },

    /// One item reached its terminal state
    ItemFinished {
        /// Item identifier, if it had one
        id: Option<ItemId>,
        /// Item title
        title: String,
        /// Terminal outcome
        outcome: ItemOutcome,
    },

    /// Run finished (completely or interrupted)
    RunComplete {
        /// Final tally
        summary: RunSummary,
    },
}
