//! Configuration types for playlist-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Download behavior configuration (directories, output naming, formats)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Base download directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Output path template relative to `download_dir`
    /// (default: "%(playlist_title)s/%(title)s.%(ext)s")
    ///
    /// Supported fields: `id`, `title`, `playlist_title`, `ext`, `extractor`.
    /// Missing fields render as `NA`.
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Format selector handed to the fetcher (default: "bestvideo+bestaudio/best")
    #[serde(default = "default_format")]
    pub format: String,

    /// Container the fetcher merges separate streams into (default: "mp4")
    ///
    /// Also decides the extension of the computed target path. `None` keeps
    /// whatever extension the metadata reports.
    #[serde(default = "default_merge_output_format")]
    pub merge_output_format: Option<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            output_template: default_output_template(),
            format: default_format(),
            merge_output_format: default_merge_output_format(),
        }
    }
}

/// External tool configuration (yt-dlp)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Retry count handed to the external tool (default: 10)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fragment retry count handed to the external tool (default: 10)
    #[serde(default = "default_retries")]
    pub fragment_retries: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
            retries: default_retries(),
            fragment_retries: default_retries(),
        }
    }
}

/// Durable state configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database path (default: "./playlist-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Store set holding completed item ids (default: "downloaded_videos")
    #[serde(default = "default_completed_set_key")]
    pub completed_set_key: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            completed_set_key: default_completed_set_key(),
        }
    }
}

/// Archive log configuration
///
/// The archive is an append-only text mirror of the completed set, one
/// `<source-tag> <id>` line per completed item.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Archive file path (default: "./archive.txt")
    #[serde(default = "default_archive_file")]
    pub archive_file: PathBuf,

    /// Source tag used when the item metadata names no extractor (default: "youtube")
    #[serde(default = "default_source_tag")]
    pub default_source_tag: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            archive_file: default_archive_file(),
            default_source_tag: default_source_tag(),
        }
    }
}

/// Metadata cache configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Prefix prepended to the URL to form the cache key (default: "ytinfo:")
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Time-to-live for cached metadata in seconds (default: 3600)
    #[serde(default = "default_cache_ttl", with = "duration_serde")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            ttl: default_cache_ttl(),
        }
    }
}

/// Resolver policy configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Drop null or empty collection entries instead of surfacing them (default: true)
    ///
    /// When disabled, such entries are kept as id-less items, which the
    /// completion gate fails without side effects.
    #[serde(default = "default_true")]
    pub drop_malformed_entries: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            drop_malformed_entries: true,
        }
    }
}

/// Main configuration for PlaylistDownloader
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) - directories, output template, formats
/// - [`tools`](ToolsConfig) - external binary discovery and retry counts
/// - [`persistence`](PersistenceConfig) - database and completed-set key
/// - [`archive`](ArchiveConfig) - archive log mirror
/// - [`cache`](CacheConfig) - metadata cache key and TTL
/// - [`resolver`](ResolverConfig) - entry dropping policy
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Durable state settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Archive log settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Metadata cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Resolver policy
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load a configuration from a JSON file
    ///
    /// Missing sections and fields fall back to their defaults. The result is
    /// validated before it is returned.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.download.output_template.trim().is_empty() {
            return Err(Error::Config {
                message: "output template must not be empty".into(),
                key: Some("output_template".into()),
            });
        }
        if self.persistence.completed_set_key.is_empty() {
            return Err(Error::Config {
                message: "completed set key must not be empty".into(),
                key: Some("completed_set_key".into()),
            });
        }
        if self.cache.key_prefix.is_empty() {
            return Err(Error::Config {
                message: "cache key prefix must not be empty".into(),
                key: Some("key_prefix".into()),
            });
        }
        if self.cache.ttl.is_zero() {
            return Err(Error::Config {
                message: "cache TTL must be at least one second".into(),
                key: Some("ttl".into()),
            });
        }
        Ok(())
    }
}

// Default value functions
fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_output_template() -> String {
    "%(playlist_title)s/%(title)s.%(ext)s".to_string()
}

fn default_format() -> String {
    "bestvideo+bestaudio/best".to_string()
}

fn default_merge_output_format() -> Option<String> {
    Some("mp4".to_string())
}

fn default_true() -> bool {
    true
}

fn default_retries() -> u32 {
    10
}

fn default_database_path() -> PathBuf {
    PathBuf::from("playlist-dl.db")
}

fn default_completed_set_key() -> String {
    "downloaded_videos".to_string()
}

fn default_archive_file() -> PathBuf {
    PathBuf::from("archive.txt")
}

fn default_source_tag() -> String {
    "youtube".to_string()
}

fn default_key_prefix() -> String {
    "ytinfo:".to_string()
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(3600)
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
