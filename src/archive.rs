//! Append-only archive log
//!
//! A plain-text mirror of the completed set, one `<source-tag> <id>` line per
//! completed item, in the format yt-dlp reads with `--download-archive`. The
//! store stays authoritative; this file is written for external tooling and
//! is never read back here.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Writer for the archive log file
#[derive(Debug, Clone)]
pub struct ArchiveLog {
    path: PathBuf,
}

impl ArchiveLog {
    /// Create a writer for the given file
    ///
    /// The file and its parent directory are created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one `<source-tag> <id>` line
    pub async fn append(&self, source_tag: &str, id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(format_line(source_tag, id).as_bytes())
            .await?;
        file.flush().await?;

        Ok(())
    }
}

fn format_line(source_tag: &str, id: &str) -> String {
    format!("{} {}\n", source_tag, id)
}
