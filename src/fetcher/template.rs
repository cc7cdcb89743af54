//! Output path templates
//!
//! Templates use yt-dlp's `%(field)s` syntax. Supported fields are `id`,
//! `title`, `playlist_title`, `ext` and `extractor`; anything else, and any
//! field the item lacks, renders as `NA`.

use crate::config::Config;
use crate::types::ItemDescriptor;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Placeholder for fields with no value
const MISSING: &str = "NA";

/// Extension used when neither a merge format nor the metadata names one
const FALLBACK_EXT: &str = "mp4";

#[allow(clippy::expect_used)]
static FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\((\w+)\)s").expect("field pattern is valid"));

/// Renders item target paths under a base directory
#[derive(Debug, Clone)]
pub struct OutputTemplate {
    base_dir: PathBuf,
    template: String,
    merge_output_format: Option<String>,
}

impl OutputTemplate {
    /// Create a template rooted at `base_dir`
    pub fn new(
        base_dir: impl Into<PathBuf>,
        template: impl Into<String>,
        merge_output_format: Option<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            template: template.into(),
            merge_output_format,
        }
    }

    /// Build the template described by a configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.download.download_dir.clone(),
            config.download.output_template.clone(),
            config.download.merge_output_format.clone(),
        )
    }

    /// Render the path for an item
    ///
    /// `playlist_title` is used when the item carries no collection title
    /// of its own.
    pub fn render(&self, item: &ItemDescriptor, playlist_title: Option<&str>) -> PathBuf {
        let playlist_title = item.collection_title.as_deref().or(playlist_title);
        let ext = self
            .merge_output_format
            .as_deref()
            .or(item.ext.as_deref())
            .unwrap_or(FALLBACK_EXT);

        let rendered = FIELD_RE.replace_all(&self.template, |caps: &regex::Captures<'_>| {
            let value = match &caps[1] {
                "id" => item.id.as_ref().map(|id| id.as_str()),
                "title" => Some(item.title.as_str()),
                "playlist_title" | "playlist" => playlist_title,
                "ext" => Some(ext),
                "extractor" | "extractor_key" => item.extractor.as_deref(),
                _ => None,
            };
            sanitize_component(value.unwrap_or(MISSING))
        });

        self.base_dir.join(rendered.as_ref())
    }
}

/// Make a field value safe to embed in a single path component
fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" => MISSING.to_string(),
        "." | ".." => "_".to_string(),
        other => other.to_string(),
    }
}
