//! Custom assertions for integration tests

use playlist_dl::{ItemOutcome, RunSummary};
use std::path::Path;

/// Outcome names of a run, in processing order
pub fn outcomes(summary: &RunSummary) -> Vec<&'static str> {
    summary
        .items
        .iter()
        .map(|report| report.outcome.as_str())
        .collect()
}

/// Assert that every item of the run ended in `expected`
pub fn assert_all(summary: &RunSummary, expected: &ItemOutcome) {
    for report in &summary.items {
        assert_eq!(
            &report.outcome, expected,
            "item {:?} ended as {:?}",
            report.id, report.outcome
        );
    }
}

/// Lines of the archive log (empty when it does not exist)
pub fn archive_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Regular files under `dir`, relative to it with `/` separators, sorted
pub fn files_under(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
