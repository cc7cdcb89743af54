//! Per-item completion gate
//!
//! [`CompletionGate::process`] decides what happens to one item, checking
//! from cheapest to most expensive:
//!
//! 1. no identifier: `Failed`, nothing touched
//! 2. already in the completion set: `Skipped`
//! 3. target path already on disk: record it, `AlreadyLocal`
//! 4. otherwise fetch: record on success (`Fetched`), `Failed` on error
//!
//! A failed fetch is never recorded, so the next run retries it. Store
//! outages are fail-open: an unanswerable membership check counts as "not
//! completed", and a failed completion write leaves the outcome as is.

use crate::completion::CompletionSet;
use crate::error::Error;
use crate::fetcher::Fetcher;
use crate::types::{ItemDescriptor, ItemId, ItemOutcome};
use std::borrow::Cow;
use std::sync::Arc;

/// Decides and performs the work for a single item
#[derive(Clone)]
pub struct CompletionGate {
    completions: CompletionSet,
    fetcher: Arc<dyn Fetcher>,
    default_source_tag: String,
}

impl CompletionGate {
    /// Create a gate
    ///
    /// `default_source_tag` is written to the archive log for items whose
    /// metadata names no extractor.
    pub fn new(
        completions: CompletionSet,
        fetcher: Arc<dyn Fetcher>,
        default_source_tag: impl Into<String>,
    ) -> Self {
        Self {
            completions,
            fetcher,
            default_source_tag: default_source_tag.into(),
        }
    }

    /// Process one item of a collection titled `collection_title`
    ///
    /// Never fails: every error ends up in [`ItemOutcome::Failed`] or is
    /// logged and absorbed.
    pub async fn process(&self, item: &ItemDescriptor, collection_title: &str) -> ItemOutcome {
        let Some(id) = item.id.as_ref() else {
            tracing::warn!(title = %item.title, "Item has no identifier, skipping");
            return ItemOutcome::Failed {
                reason: Error::MalformedItem("missing identifier".into()).to_string(),
            };
        };

        if self.is_recorded(id).await {
            tracing::info!(id = %id, title = %item.title, "Already downloaded, skipping");
            return ItemOutcome::Skipped;
        }

        // The local check and the fetch must agree on the path
        let item = with_collection_title(item, collection_title);
        let target = self.fetcher.compute_target_path(&item, Some(collection_title));
        if self.exists_locally(&target).await {
            tracing::info!(
                id = %id,
                path = %target.display(),
                "File already exists, recording as complete"
            );
            self.record(&item, id).await;
            return ItemOutcome::AlreadyLocal;
        }

        tracing::info!(id = %id, title = %item.title, "Fetching");
        match self.fetcher.fetch(&item).await {
            Ok(()) => {
                self.record(&item, id).await;
                tracing::info!(id = %id, path = %target.display(), "Fetched");
                ItemOutcome::Fetched
            }
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Fetch failed, will retry on next run");
                ItemOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn is_recorded(&self, id: &ItemId) -> bool {
        match self.completions.contains(id).await {
            Ok(recorded) => recorded,
            Err(e) => {
                tracing::warn!(
                    id = %id,
                    error = %e,
                    "Completion set unavailable, assuming not downloaded"
                );
                false
            }
        }
    }

    async fn exists_locally(&self, path: &std::path::Path) -> bool {
        match tokio::fs::try_exists(path).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not check for existing file");
                false
            }
        }
    }

    async fn record(&self, item: &ItemDescriptor, id: &ItemId) {
        let source_tag = item.source_tag(&self.default_source_tag);
        if let Err(e) = self.completions.mark_complete(id, &source_tag).await {
            tracing::warn!(
                id = %id,
                error = %e,
                "Failed to record completion, item will be revisited next run"
            );
        }
    }
}

/// Fill in the collection title the item is processed under
fn with_collection_title<'a>(
    item: &'a ItemDescriptor,
    collection_title: &str,
) -> Cow<'a, ItemDescriptor> {
    if item.collection_title.is_some() {
        return Cow::Borrowed(item);
    }
    Cow::Owned(ItemDescriptor {
        collection_title: Some(collection_title.to_string()),
        ..item.clone()
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveLog;
    use crate::error::{FetchError, StoreError};
    use crate::fetcher::OutputTemplate;
    use crate::store::{MemoryStore, Store};
    use crate::types::RawMetadata;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Fetcher that writes an empty file, or fails for chosen ids
    struct RecordingFetcher {
        template: OutputTemplate,
        fail_ids: Vec<String>,
        fetched: Mutex<Vec<String>>,
    }

    impl RecordingFetcher {
        fn new(dir: &Path, fail_ids: &[&str]) -> Self {
            Self {
                template: OutputTemplate::new(
                    dir,
                    "%(playlist_title)s/%(title)s.%(ext)s",
                    Some("mp4".into()),
                ),
                fail_ids: fail_ids.iter().map(|s| s.to_string()).collect(),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for RecordingFetcher {
        async fn resolve_metadata(&self, _url: &str) -> crate::Result<RawMetadata> {
            unreachable!("the gate never resolves metadata")
        }

        async fn fetch(&self, item: &ItemDescriptor) -> crate::Result<()> {
            let id = item.label().to_string();
            self.fetched.lock().unwrap().push(id.clone());
            if self.fail_ids.contains(&id) {
                return Err(Error::Fetch(FetchError::Failed {
                    id,
                    reason: "HTTP Error 403".into(),
                }));
            }
            let target = self.compute_target_path(item, None);
            std::fs::create_dir_all(target.parent().unwrap()).unwrap();
            std::fs::write(target, b"media").unwrap();
            Ok(())
        }

        fn compute_target_path(
            &self,
            item: &ItemDescriptor,
            collection_title: Option<&str>,
        ) -> PathBuf {
            self.template.render(item, collection_title)
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    /// Store whose every operation fails
    struct DownStore;

    #[async_trait]
    impl Store for DownStore {
        async fn set_contains(&self, _set_key: &str, _member: &str) -> crate::Result<bool> {
            Err(StoreError::Unavailable("connection refused".into()).into())
        }

        async fn set_add(&self, _set_key: &str, _member: &str) -> crate::Result<()> {
            Err(StoreError::Unavailable("connection refused".into()).into())
        }

        async fn get_with_ttl(&self, _key: &str) -> crate::Result<Option<Vec<u8>>> {
            Err(StoreError::Unavailable("connection refused".into()).into())
        }

        async fn set_with_ttl(&self, _key: &str, _value: &[u8], _ttl: Duration) -> crate::Result<()> {
            Err(StoreError::Unavailable("connection refused".into()).into())
        }

        fn name(&self) -> &'static str {
            "down"
        }
    }

    struct Harness {
        dir: TempDir,
        store: Arc<MemoryStore>,
        completions: CompletionSet,
        fetcher: Arc<RecordingFetcher>,
        gate: CompletionGate,
    }

    fn harness(fail_ids: &[&str]) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let completions = CompletionSet::new(
            store.clone(),
            "downloaded_videos",
            ArchiveLog::new(dir.path().join("archive.txt")),
        );
        let fetcher = Arc::new(RecordingFetcher::new(&dir.path().join("downloads"), fail_ids));
        let gate = CompletionGate::new(completions.clone(), fetcher.clone(), "youtube");
        Harness {
            dir,
            store,
            completions,
            fetcher,
            gate,
        }
    }

    fn item(id: &str) -> ItemDescriptor {
        ItemDescriptor {
            id: Some(ItemId::from(id)),
            title: format!("Video {id}"),
            collection_title: Some("List".into()),
            url: Some(format!("https://www.youtube.com/watch?v={id}")),
            ..Default::default()
        }
    }

    fn archive(h: &Harness) -> String {
        std::fs::read_to_string(h.dir.path().join("archive.txt")).unwrap_or_default()
    }

    #[tokio::test]
    async fn new_item_is_fetched_and_recorded() {
        let h = harness(&[]);

        let outcome = h.gate.process(&item("a"), "List").await;

        assert_eq!(outcome, ItemOutcome::Fetched);
        assert_eq!(h.fetcher.fetched(), vec!["a"]);
        assert!(h.completions.contains(&ItemId::from("a")).await.unwrap());
        assert_eq!(archive(&h), "youtube a\n");
    }

    #[tokio::test]
    async fn recorded_item_is_skipped_without_fetching() {
        let h = harness(&[]);
        h.completions
            .mark_complete(&ItemId::from("a"), "youtube")
            .await
            .unwrap();

        let outcome = h.gate.process(&item("a"), "List").await;

        assert_eq!(outcome, ItemOutcome::Skipped);
        assert!(h.fetcher.fetched().is_empty());
    }

    #[tokio::test]
    async fn existing_file_is_recorded_without_fetching() {
        let h = harness(&[]);
        let target = h.dir.path().join("downloads/List/Video a.mp4");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"already here").unwrap();

        let outcome = h.gate.process(&item("a"), "List").await;

        assert_eq!(outcome, ItemOutcome::AlreadyLocal);
        assert!(h.fetcher.fetched().is_empty());
        assert!(h.completions.contains(&ItemId::from("a")).await.unwrap());
        assert_eq!(archive(&h), "youtube a\n");
    }

    #[tokio::test]
    async fn failed_fetch_is_not_recorded() {
        let h = harness(&["a"]);

        let outcome = h.gate.process(&item("a"), "List").await;

        match outcome {
            ItemOutcome::Failed { reason } => assert!(reason.contains("HTTP Error 403")),
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(!h.completions.contains(&ItemId::from("a")).await.unwrap());
        assert_eq!(archive(&h), "");
    }

    #[tokio::test]
    async fn item_without_id_fails_without_side_effects() {
        let h = harness(&[]);
        let mut malformed = item("a");
        malformed.id = None;

        let outcome = h.gate.process(&malformed, "List").await;

        assert_eq!(
            outcome,
            ItemOutcome::Failed {
                reason: "malformed item: missing identifier".into()
            }
        );
        assert!(h.fetcher.fetched().is_empty());
        assert_eq!(h.store.set_len("downloaded_videos").await, 0);
        assert_eq!(archive(&h), "");
    }

    #[tokio::test]
    async fn extractor_becomes_archive_source_tag() {
        let h = harness(&[]);
        let mut vimeo = item("123");
        vimeo.extractor = Some("Vimeo".into());

        h.gate.process(&vimeo, "List").await;

        assert_eq!(archive(&h), "vimeo 123\n");
    }

    #[tokio::test]
    async fn item_collection_title_decides_local_path() {
        let h = harness(&[]);
        let mut own = item("a");
        own.collection_title = Some("Own".into());
        let target = h.dir.path().join("downloads/Own/Video a.mp4");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"x").unwrap();

        let outcome = h.gate.process(&own, "Context").await;

        assert_eq!(outcome, ItemOutcome::AlreadyLocal);
    }

    #[tokio::test]
    async fn item_without_collection_title_is_fetched_where_it_is_checked() {
        let h = harness(&[]);
        let mut loose = item("a");
        loose.collection_title = None;

        let first = h.gate.process(&loose, "List").await;
        assert_eq!(first, ItemOutcome::Fetched);
        assert!(h.dir.path().join("downloads/List/Video a.mp4").is_file());
        assert!(!h.dir.path().join("downloads/NA").exists());

        // Forget the completion: the file on disk must now be found
        let fresh = CompletionSet::new(
            Arc::new(MemoryStore::new()),
            "downloaded_videos",
            ArchiveLog::new(h.dir.path().join("archive.txt")),
        );
        let gate = CompletionGate::new(fresh, h.fetcher.clone(), "youtube");
        let second = gate.process(&loose, "List").await;

        assert_eq!(second, ItemOutcome::AlreadyLocal);
        assert_eq!(h.fetcher.fetched(), vec!["a"]);
    }

    #[tokio::test]
    async fn unavailable_store_fails_open_to_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let completions = CompletionSet::new(
            Arc::new(DownStore),
            "downloaded_videos",
            ArchiveLog::new(dir.path().join("archive.txt")),
        );
        let fetcher = Arc::new(RecordingFetcher::new(&dir.path().join("downloads"), &[]));
        let gate = CompletionGate::new(completions, fetcher.clone(), "youtube");

        let outcome = gate.process(&item("a"), "List").await;

        assert_eq!(outcome, ItemOutcome::Fetched);
        assert_eq!(fetcher.fetched(), vec!["a"]);
        assert!(
            !dir.path().join("archive.txt").exists(),
            "archive is only written after the store accepted the record"
        );
    }
}
