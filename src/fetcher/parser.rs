//! Parsing of yt-dlp process output

use crate::error::{Error, ResolutionError};
use crate::types::RawMetadata;

/// Longest stderr excerpt carried into error messages
const MAX_EXCERPT_LEN: usize = 500;

/// Exit status of the external process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitStatus {
    Success,
    Failure,
}

impl From<bool> for ExitStatus {
    fn from(success: bool) -> Self {
        if success {
            ExitStatus::Success
        } else {
            ExitStatus::Failure
        }
    }
}

/// Parse the output of `yt-dlp --dump-single-json`
///
/// With `--ignore-errors`, yt-dlp exits non-zero when some playlist entries
/// failed but still prints the metadata it could gather. Usable JSON is
/// accepted regardless of the exit status.
pub(crate) fn parse_metadata_output(
    url: &str,
    stdout: &[u8],
    stderr: &[u8],
    status: ExitStatus,
) -> crate::Result<RawMetadata> {
    let stdout = String::from_utf8_lossy(stdout);
    let stdout = stdout.trim();

    if stdout.is_empty() {
        let reason = match stderr_excerpt(stderr) {
            Some(excerpt) => excerpt,
            None if status == ExitStatus::Success => "no output".to_string(),
            None => "exited with failure and no output".to_string(),
        };
        return Err(Error::Resolution(ResolutionError::Extraction {
            url: url.to_string(),
            reason,
        }));
    }

    let value: serde_json::Value = serde_json::from_str(stdout).map_err(|e| {
        Error::Resolution(ResolutionError::InvalidMetadata {
            url: url.to_string(),
            reason: format!("output is not JSON: {}", e),
        })
    })?;

    if !value.is_object() {
        return Err(Error::Resolution(ResolutionError::InvalidMetadata {
            url: url.to_string(),
            reason: "top-level value is not an object".to_string(),
        }));
    }

    if status == ExitStatus::Failure {
        tracing::warn!(
            url,
            stderr = %stderr_excerpt(stderr).unwrap_or_default(),
            "yt-dlp reported errors but produced metadata, continuing"
        );
    }

    Ok(RawMetadata::new(value))
}

/// Last meaningful stderr line, truncated
pub(crate) fn stderr_excerpt(stderr: &[u8]) -> Option<String> {
    let stderr = String::from_utf8_lossy(stderr);
    let line = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())?;

    Some(line.chars().take(MAX_EXCERPT_LEN).collect())
}
