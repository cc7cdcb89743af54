//! CLI-based fetcher using the external yt-dlp binary

use super::Fetcher;
use super::parser::{ExitStatus, parse_metadata_output, stderr_excerpt};
use super::template::OutputTemplate;
use crate::config::Config;
use crate::error::{Error, FetchError, ResolutionError};
use crate::types::{ItemDescriptor, RawMetadata};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Fetcher that shells out to `yt-dlp`
///
/// Metadata comes from `--dump-single-json`; each item is then retrieved
/// on its own with `--no-playlist`, written to the path rendered by the
/// [`OutputTemplate`].
///
/// # Examples
///
/// ```no_run
/// use playlist_dl::Config;
/// use playlist_dl::fetcher::CliFetcher;
/// use std::path::PathBuf;
///
/// let config = Config::default();
///
/// // Create with explicit path
/// let fetcher = CliFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"), &config);
///
/// // Or auto-discover from PATH
/// let fetcher = CliFetcher::from_path(&config).expect("yt-dlp not found in PATH");
/// ```
pub struct CliFetcher {
    binary_path: PathBuf,
    template: OutputTemplate,
    format: String,
    merge_output_format: Option<String>,
    retries: u32,
    fragment_retries: u32,
}

impl CliFetcher {
    /// Create a new CLI fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf, config: &Config) -> Self {
        Self {
            binary_path,
            template: OutputTemplate::from_config(config),
            format: config.download.format.clone(),
            merge_output_format: config.download.merge_output_format.clone(),
            retries: config.tools.retries,
            fragment_retries: config.tools.fragment_retries,
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// Returns `None` if the binary is not found.
    pub fn from_path(config: &Config) -> Option<Self> {
        which::which("yt-dlp")
            .ok()
            .map(|path| Self::new(path, config))
    }

    /// Locate yt-dlp as the configuration asks
    ///
    /// An explicit `ytdlp_path` wins; otherwise PATH is searched when
    /// `search_path` is enabled.
    pub fn from_config(config: &Config) -> Option<Self> {
        match &config.tools.ytdlp_path {
            Some(path) => Some(Self::new(path.clone(), config)),
            None if config.tools.search_path => Self::from_path(config),
            None => None,
        }
    }

    /// Path of the binary this fetcher runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Arguments for retrieving one item
    fn fetch_args(&self, url: &str, target: &Path) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--continue".to_string(),
            "-f".to_string(),
            self.format.clone(),
            "--retries".to_string(),
            self.retries.to_string(),
            "--fragment-retries".to_string(),
            self.fragment_retries.to_string(),
        ];
        if let Some(merge) = &self.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(merge.clone());
        }
        // yt-dlp treats -o as a template, so literal percent signs need escaping
        args.push("-o".to_string());
        args.push(target.to_string_lossy().replace('%', "%%"));
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl Fetcher for CliFetcher {
    async fn resolve_metadata(&self, url: &str) -> crate::Result<RawMetadata> {
        let output = Command::new(&self.binary_path)
            .arg("--dump-single-json")
            .arg("--ignore-errors")
            .arg("--no-warnings")
            .arg(url)
            .output()
            .await
            .map_err(|e| {
                Error::Resolution(ResolutionError::Extraction {
                    url: url.to_string(),
                    reason: format!("Failed to execute yt-dlp: {}", e),
                })
            })?;

        parse_metadata_output(
            url,
            &output.stdout,
            &output.stderr,
            ExitStatus::from(output.status.success()),
        )
    }

    async fn fetch(&self, item: &ItemDescriptor) -> crate::Result<()> {
        let id = item.label().to_string();
        let url = item
            .url
            .as_deref()
            .ok_or_else(|| Error::Fetch(FetchError::MissingUrl { id: id.clone() }))?;

        let target = self.compute_target_path(item, None);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Fetch(FetchError::Target {
                    path: target.clone(),
                    reason: e.to_string(),
                })
            })?;
        }

        tracing::debug!(id = %id, url, target = %target.display(), "Running yt-dlp");

        let output = Command::new(&self.binary_path)
            .args(self.fetch_args(url, &target))
            .output()
            .await
            .map_err(|e| {
                Error::Fetch(FetchError::Failed {
                    id: id.clone(),
                    reason: format!("Failed to execute yt-dlp: {}", e),
                })
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let reason = stderr_excerpt(&output.stderr)
                .unwrap_or_else(|| format!("yt-dlp exited with {}", output.status));
            Err(Error::Fetch(FetchError::Failed { id, reason }))
        }
    }

    fn compute_target_path(
        &self,
        item: &ItemDescriptor,
        collection_title: Option<&str>,
    ) -> PathBuf {
        self.template.render(item, collection_title)
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
