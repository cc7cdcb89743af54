//! No-op fetcher for graceful degradation

use super::Fetcher;
use super::template::OutputTemplate;
use crate::types::{ItemDescriptor, RawMetadata};
use async_trait::async_trait;
use std::path::PathBuf;

/// Fetcher used when yt-dlp is unavailable
///
/// Resolution and retrieval both return `Error::NotSupported`. Target
/// paths are still computed, so callers can inspect what is already on disk.
///
/// # Examples
///
/// ```
/// use playlist_dl::Config;
/// use playlist_dl::fetcher::{Fetcher, NoOpFetcher, OutputTemplate};
///
/// # #[tokio::main]
/// # async fn main() {
/// let fetcher = NoOpFetcher::new(OutputTemplate::from_config(&Config::default()));
/// assert!(fetcher.resolve_metadata("https://example.com").await.is_err());
/// # }
/// ```
pub struct NoOpFetcher {
    template: OutputTemplate,
}

impl NoOpFetcher {
    /// Create a no-op fetcher that still renders target paths
    pub fn new(template: OutputTemplate) -> Self {
        Self { template }
    }
}

#[async_trait]
impl Fetcher for NoOpFetcher {
    async fn resolve_metadata(&self, _url: &str) -> crate::Result<RawMetadata> {
        Err(crate::Error::NotSupported(
            "Metadata resolution requires the external yt-dlp binary. \
             Configure ytdlp_path in config or ensure yt-dlp is in PATH."
                .into(),
        ))
    }

    async fn fetch(&self, _item: &ItemDescriptor) -> crate::Result<()> {
        Err(crate::Error::NotSupported(
            "Fetching requires the external yt-dlp binary. \
             Configure ytdlp_path in config or ensure yt-dlp is in PATH."
                .into(),
        ))
    }

    fn compute_target_path(
        &self,
        item: &ItemDescriptor,
        collection_title: Option<&str>,
    ) -> PathBuf {
        self.template.render(item, collection_title)
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
