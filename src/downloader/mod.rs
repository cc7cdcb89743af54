//! Playlist downloader, split into focused submodules.
//!
//! - [`run`] - Resolve a URL and drive every item through the completion gate
//! - [`lifecycle`] - Cancellation, signal handling and shutdown

mod lifecycle;
mod run;


pub use lifecycle::run_until_signal;

use crate::archive::ArchiveLog;
use crate::cache::MetadataCache;
use crate::completion::CompletionSet;
use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::fetcher::{CliFetcher, Fetcher, NoOpFetcher, OutputTemplate};
use crate::gate::CompletionGate;
use crate::resolver::ItemResolver;
use crate::store::Store;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Buffer size of the event channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Main downloader instance (cloneable - all fields are Arc-wrapped or cheap to clone)
#[derive(Clone)]
pub struct PlaylistDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Backing key-value store shared by the completion set and metadata cache
    pub(crate) store: Arc<dyn Store>,
    /// External fetcher (trait object for pluggable implementations)
    pub(crate) fetcher: Arc<dyn Fetcher>,
    /// URL to collection resolution
    pub(crate) resolver: ItemResolver,
    /// Per-item decision logic
    pub(crate) gate: CompletionGate,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<crate::types::Event>,
    /// Cancels the current and any later run
    pub(crate) cancel: CancellationToken,
}

impl PlaylistDownloader {
    /// Create a new PlaylistDownloader instance
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Creates the download directory
    /// - Opens/creates the SQLite database and runs migrations
    /// - Locates yt-dlp, falling back to a no-op fetcher when it is missing
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(config.download_dir())
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download_dir().display(),
                        e
                    ),
                ))
            })?;

        let db = Database::new(&config.persistence.database_path).await?;

        let fetcher: Arc<dyn Fetcher> = match CliFetcher::from_config(&config) {
            Some(cli) => {
                tracing::info!(binary = %cli.binary_path().display(), "Using yt-dlp");
                Arc::new(cli)
            }
            None => {
                tracing::warn!(
                    "yt-dlp not found; resolution and fetching will fail until it is installed"
                );
                Arc::new(NoOpFetcher::new(OutputTemplate::from_config(&config)))
            }
        };

        Ok(Self::with_components(config, Arc::new(db), fetcher))
    }

    /// Assemble a downloader from an existing store and fetcher
    ///
    /// No I/O happens here: the download directory is created lazily by the
    /// fetcher and the store is used as given.
    pub fn with_components(config: Config, store: Arc<dyn Store>, fetcher: Arc<dyn Fetcher>) -> Self {
        let cache = MetadataCache::new(store.clone(), config.cache.key_prefix.clone());
        let resolver = ItemResolver::new(
            fetcher.clone(),
            cache,
            config.cache.ttl,
            config.resolver.drop_malformed_entries,
        );
        let completions = CompletionSet::new(
            store.clone(),
            config.persistence.completed_set_key.clone(),
            ArchiveLog::new(config.archive.archive_file.clone()),
        );
        let gate = CompletionGate::new(
            completions,
            fetcher.clone(),
            config.archive.default_source_tag.clone(),
        );
        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::debug!(
            store = store.name(),
            fetcher = fetcher.name(),
            "Downloader components assembled"
        );

        Self {
            config: Arc::new(config),
            store,
            fetcher,
            resolver,
            gate,
            event_tx,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribe to run events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// A subscriber that falls more than 1000 events behind receives
    /// `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use playlist_dl::{Config, Event, PlaylistDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = PlaylistDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             if let Event::ItemFinished { title, outcome, .. } = event {
    ///                 println!("{title}: {}", outcome.as_str());
    ///             }
    ///         }
    ///     });
    ///
    ///     downloader.run("https://www.youtube.com/playlist?list=PL123").await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<crate::types::Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Name of the fetcher in use ("cli-yt-dlp" or "noop" outside of tests)
    pub fn fetcher_name(&self) -> &'static str {
        self.fetcher.name()
    }

    /// Emit an event to all subscribers
    ///
    /// With no subscribers the event is dropped.
    pub(crate) fn emit_event(&self, event: crate::types::Event) {
        self.event_tx.send(event).ok();
    }
}
