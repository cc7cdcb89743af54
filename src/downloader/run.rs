//! Run orchestration: resolve once, then gate every item in order.

use crate::error::Result;
use crate::types::{Event, RunSummary};

use super::PlaylistDownloader;

impl PlaylistDownloader {
    /// Download everything behind `url` that is not yet completed
    ///
    /// Resolves the URL (through the metadata cache) and hands each item to
    /// the completion gate in resolution order. A failing item is recorded in
    /// the summary and the run moves on to the next one.
    ///
    /// Cancellation is checked between items: once the token fires, the
    /// remaining items are left untouched and the summary is marked
    /// interrupted. Running again resumes where this run stopped.
    ///
    /// # Errors
    ///
    /// Only a failure to resolve `url` aborts the run. Store outages and
    /// per-item fetch failures never surface here.
    pub async fn run(&self, url: &str) -> Result<RunSummary> {
        let resolution = match self.resolver.resolve_detailed(url).await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::error!(url, error = %e, "Failed to resolve URL");
                return Err(e);
            }
        };
        let collection = resolution.collection;

        tracing::info!(
            url,
            title = %collection.title,
            items = collection.len(),
            from_cache = resolution.from_cache,
            "Resolved collection"
        );
        self.emit_event(Event::Resolved {
            url: url.to_string(),
            title: collection.title.clone(),
            items: collection.len(),
            from_cache: resolution.from_cache,
        });

        let mut summary = RunSummary::new(collection.title.clone());
        for (index, item) in collection.items.iter().enumerate() {
            if self.cancel.is_cancelled() {
                summary.interrupted = true;
                summary.pending = collection.len() - index;
                tracing::warn!(
                    pending = summary.pending,
                    "Run cancelled, remaining items left for the next run"
                );
                break;
            }

            tracing::debug!(
                position = index + 1,
                total = collection.len(),
                item = item.label(),
                "Processing item"
            );
            let outcome = self.gate.process(item, &collection.title).await;

            self.emit_event(Event::ItemFinished {
                id: item.id.clone(),
                title: item.title.clone(),
                outcome: outcome.clone(),
            });
            summary.record(item, outcome);
        }

        if summary.failed > 0 {
            tracing::warn!(
                fetched = summary.fetched,
                already_local = summary.already_local,
                skipped = summary.skipped,
                failed = summary.failed,
                "Run finished with failures: {}",
                summary
            );
        } else {
            tracing::info!(
                fetched = summary.fetched,
                already_local = summary.already_local,
                skipped = summary.skipped,
                "Run finished: {}",
                summary
            );
        }

        self.emit_event(Event::RunComplete {
            summary: summary.clone(),
        });
        Ok(summary)
    }
}
