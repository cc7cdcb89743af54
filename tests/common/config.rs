//! Test configuration helpers for building isolated downloaders

use playlist_dl::config::{ArchiveConfig, DownloadConfig, PersistenceConfig};
use playlist_dl::Config;
use tempfile::TempDir;

/// Configuration rooted entirely inside `dir`
pub fn test_config(dir: &TempDir) -> Config {
    Config {
        download: DownloadConfig {
            download_dir: dir.path().join("downloads"),
            ..Default::default()
        },
        persistence: PersistenceConfig {
            database_path: dir.path().join("playlist-dl.db"),
            ..Default::default()
        },
        archive: ArchiveConfig {
            archive_file: dir.path().join("archive.txt"),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Load live test settings from `.env`
///
/// Returns the URL in `LIVE_TEST_URL`, or `None` when it is not set.
pub fn live_test_url() -> Option<String> {
    dotenvy::dotenv().ok();
    std::env::var("LIVE_TEST_URL")
        .ok()
        .filter(|url| !url.is_empty())
}
