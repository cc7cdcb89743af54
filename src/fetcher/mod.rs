//! Media fetching
//!
//! Everything that touches the network or the media itself sits behind the
//! [`Fetcher`] trait: metadata extraction, the actual retrieval, and the
//! deterministic target path an item is written to.
//!
//! ## Architecture
//!
//! - [`CliFetcher`]: drives an external `yt-dlp` binary
//! - [`NoOpFetcher`]: stub used when no binary is available
//!
//! Both render target paths with the same [`OutputTemplate`], so the
//! "already on disk" check and the fetch agree on where an item lives.
//!
//! ## Usage
//!
//! ```no_run
//! use playlist_dl::Config;
//! use playlist_dl::fetcher::{CliFetcher, Fetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = CliFetcher::from_path(&Config::default())
//!         .expect("yt-dlp binary not found");
//!
//!     let metadata = fetcher
//!         .resolve_metadata("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .await?;
//!     println!("{}", metadata.as_value()["title"]);
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
mod parser;
mod template;

pub use cli::CliFetcher;
pub use noop::NoOpFetcher;
pub use template::OutputTemplate;

use crate::types::{ItemDescriptor, RawMetadata};
use async_trait::async_trait;
use std::path::PathBuf;

/// Trait for media retrieval backends
///
/// Retry policy, format selection and muxing are the implementation's own
/// business.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Extract metadata for a URL without retrieving any media
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` if the URL cannot be resolved.
    async fn resolve_metadata(&self, url: &str) -> crate::Result<RawMetadata>;

    /// Retrieve one item to its target path
    ///
    /// # Errors
    ///
    /// Returns `Error::Fetch` if the item could not be retrieved.
    async fn fetch(&self, item: &ItemDescriptor) -> crate::Result<()>;

    /// Deterministic path the item is (or would be) stored at
    ///
    /// The item's own `collection_title` field takes precedence over the
    /// `collection_title` argument.
    fn compute_target_path(
        &self,
        item: &ItemDescriptor,
        collection_title: Option<&str>,
    ) -> PathBuf;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
