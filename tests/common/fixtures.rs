//! Test doubles: a scripted fetcher and a store that can be taken offline

use async_trait::async_trait;
use playlist_dl::fetcher::{Fetcher, OutputTemplate};
use playlist_dl::{
    Config, Error, FetchError, ItemDescriptor, MemoryStore, RawMetadata, ResolutionError, Store,
    StoreError,
};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Playlist URL served by [`sample_playlist`]
pub const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PLtest";

/// Single video URL served by [`sample_video`]
pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=solo1";

/// Three-item playlist titled "Mix"
pub fn sample_playlist() -> Value {
    json!({
        "_type": "playlist",
        "id": "PLtest",
        "title": "Mix",
        "extractor_key": "YoutubeTab",
        "entries": [
            entry("a1", "First"),
            entry("b2", "Second"),
            entry("c3", "Third"),
        ]
    })
}

/// Metadata for a single video
pub fn sample_video() -> Value {
    json!({
        "id": "solo1",
        "title": "Only One",
        "ext": "webm",
        "webpage_url": VIDEO_URL,
        "extractor_key": "Youtube"
    })
}

/// One playlist entry as yt-dlp reports it
pub fn entry(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "ext": "webm",
        "webpage_url": format!("https://www.youtube.com/watch?v={id}"),
        "extractor_key": "Youtube"
    })
}

/// Fetcher answering from canned metadata and writing a stub file per item
pub struct ScriptedFetcher {
    template: OutputTemplate,
    metadata: HashMap<String, Value>,
    failing: Mutex<HashSet<String>>,
    resolutions: AtomicUsize,
    fetched: Mutex<Vec<String>>,
    cancel_after: Mutex<Option<(usize, CancellationToken)>>,
}

impl ScriptedFetcher {
    /// Fetcher rendering paths the way `config` asks
    pub fn new(config: &Config) -> Self {
        Self {
            template: OutputTemplate::from_config(config),
            metadata: HashMap::new(),
            failing: Mutex::new(HashSet::new()),
            resolutions: AtomicUsize::new(0),
            fetched: Mutex::new(Vec::new()),
            cancel_after: Mutex::new(None),
        }
    }

    /// Serve `metadata` for `url`
    pub fn with_metadata(mut self, url: &str, metadata: Value) -> Self {
        self.metadata.insert(url.to_string(), metadata);
        self
    }

    /// Make every fetch of `id` fail
    pub fn fail(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    /// Let fetches of `id` succeed again
    pub fn heal(&self, id: &str) {
        self.failing.lock().unwrap().remove(id);
    }

    /// Cancel `token` once `count` fetches have been attempted
    pub fn cancel_after(&self, count: usize, token: CancellationToken) {
        *self.cancel_after.lock().unwrap() = Some((count, token));
    }

    /// Number of metadata resolutions performed
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }

    /// Ids passed to `fetch`, in call order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn resolve_metadata(&self, url: &str) -> playlist_dl::Result<RawMetadata> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        self.metadata
            .get(url)
            .cloned()
            .map(RawMetadata::new)
            .ok_or_else(|| {
                Error::Resolution(ResolutionError::Extraction {
                    url: url.to_string(),
                    reason: "ERROR: Unsupported URL".into(),
                })
            })
    }

    async fn fetch(&self, item: &ItemDescriptor) -> playlist_dl::Result<()> {
        let id = item.label().to_string();
        let attempts = {
            let mut fetched = self.fetched.lock().unwrap();
            fetched.push(id.clone());
            fetched.len()
        };
        if let Some((count, token)) = self.cancel_after.lock().unwrap().as_ref() {
            if attempts >= *count {
                token.cancel();
            }
        }

        if self.failing.lock().unwrap().contains(&id) {
            return Err(Error::Fetch(FetchError::Failed {
                id,
                reason: "ERROR: HTTP Error 403: Forbidden".into(),
            }));
        }

        let target = self.compute_target_path(item, None);
        tokio::fs::create_dir_all(target.parent().unwrap()).await?;
        tokio::fs::write(&target, id.as_bytes()).await?;
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
        "scripted"
    }
}

/// In-memory store that can be switched offline
#[derive(Default)]
pub struct SwitchableStore {
    inner: MemoryStore,
    offline: AtomicBool,
}

impl SwitchableStore {
    /// Store that starts online
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the store offline (`true`) or back online (`false`)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> playlist_dl::Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".into()).into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for SwitchableStore {
    async fn set_contains(&self, set_key: &str, member: &str) -> playlist_dl::Result<bool> {
        self.check()?;
        self.inner.set_contains(set_key, member).await
    }

    async fn set_add(&self, set_key: &str, member: &str) -> playlist_dl::Result<()> {
        self.check()?;
        self.inner.set_add(set_key, member).await
    }

    async fn get_with_ttl(&self, key: &str) -> playlist_dl::Result<Option<Vec<u8>>> {
        self.check()?;
        self.inner.get_with_ttl(key).await
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> playlist_dl::Result<()> {
        self.check()?;
        self.inner.set_with_ttl(key, value, ttl).await
    }

    fn name(&self) -> &'static str {
        "switchable"
    }
}
