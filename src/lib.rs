//! # playlist-dl
//!
//! Idempotent playlist and video downloader built on yt-dlp.
//!
//! ## Design Philosophy
//!
//! playlist-dl is designed to be:
//! - **Resumable** - Re-running against the same URL only retrieves what is missing
//! - **Fail-open** - A store outage causes redundant work, never lost work
//! - **Library-first** - A small entry point plus composable parts for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! Completed item ids live in a SQLite-backed set (mirrored to an append-only
//! archive log), resolved metadata is cached with a TTL, and each item passes
//! through a completion gate that skips, records, or fetches it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use playlist_dl::{Config, PlaylistDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.download.download_dir = "media".into();
//!
//!     let downloader = PlaylistDownloader::new(config).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = downloader
//!         .run("https://www.youtube.com/playlist?list=PL123")
//!         .await?;
//!     println!("{summary}");
//!
//!     downloader.shutdown().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Append-only archive log
pub mod archive;
/// TTL cache for resolved metadata
pub mod cache;
/// Durable completion tracking
pub mod completion;
/// Configuration types
pub mod config;
/// SQLite persistence layer
pub mod db;
/// Run orchestration (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// External fetcher abstraction and yt-dlp integration
pub mod fetcher;
/// Per-item skip/record/fetch decision
pub mod gate;
/// URL to collection resolution
pub mod resolver;
/// Key-value store abstraction
pub mod store;
/// Core types and events
pub mod types;

use std::path::Path;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use downloader::{PlaylistDownloader, run_until_signal};
pub use error::{DatabaseError, Error, FetchError, ResolutionError, Result, StoreError};
pub use fetcher::{CliFetcher, Fetcher, NoOpFetcher, OutputTemplate};
pub use store::{MemoryStore, Store};
pub use types::{
    Collection, Event, ItemDescriptor, ItemId, ItemOutcome, ItemReport, RawMetadata, RunSummary,
};

/// Download a playlist or single video with default settings
///
/// `download_dir` overrides the configured download directory. The database
/// and archive log stay in the working directory, so completions are shared
/// between runs into different directories.
///
/// # Errors
///
/// Fails when the store cannot be opened or the URL cannot be resolved.
/// Individual item failures are reported in the returned summary.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> playlist_dl::Result<()> {
/// let summary = playlist_dl::download(
///     "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
///     Some(std::path::Path::new("videos")),
/// )
/// .await?;
/// assert!(summary.failed == 0);
/// # Ok(())
/// # }
/// ```
pub async fn download(url: &str, download_dir: Option<&Path>) -> Result<RunSummary> {
    let mut config = Config::default();
    if let Some(dir) = download_dir {
        config.download.download_dir = dir.to_path_buf();
    }

    let downloader = PlaylistDownloader::new(config).await?;
    let result = downloader.run(url).await;
    downloader.shutdown().await;
    result
}
