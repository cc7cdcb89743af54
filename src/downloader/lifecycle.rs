//! Cancellation, signal handling and shutdown.

use crate::error::Result;
use crate::types::RunSummary;
use tokio_util::sync::CancellationToken;

use super::PlaylistDownloader;

impl PlaylistDownloader {
    /// Token that stops the current run between items
    ///
    /// Clones share state with the downloader; cancelling any of them
    /// interrupts this and every later run of this instance.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Ask the current run to stop after the item in progress
    pub fn cancel(&self) {
        tracing::info!("Cancellation requested");
        self.cancel.cancel();
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Shut the downloader down
    ///
    /// Cancels any ongoing run and closes the backing store. Safe to call
    /// more than once.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating shutdown");
        self.cancel.cancel();
        self.store.close().await;
        tracing::info!(store = self.store.name(), "Shutdown complete");
    }
}

/// Run `url` to completion, stopping early on a termination signal.
///
/// On a signal the downloader is cancelled and the item in progress is
/// allowed to finish; the returned summary is then marked interrupted.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use playlist_dl::{Config, PlaylistDownloader, run_until_signal};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = PlaylistDownloader::new(Config::default()).await?;
///
///     let summary = run_until_signal(&downloader, "https://www.youtube.com/playlist?list=PL123").await?;
///     println!("{summary}");
///
///     downloader.shutdown().await;
///     Ok(())
/// }
/// ```
pub async fn run_until_signal(downloader: &PlaylistDownloader, url: &str) -> Result<RunSummary> {
    let run = downloader.run(url);
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => return result,
        _ = wait_for_signal() => {
            tracing::info!("Stopping after the current item");
            downloader.cancel();
        }
    }

    run.await
}

/// Resolve once a termination signal arrives
///
/// Falls back to Ctrl+C when no Unix handler registers. If nothing can be
/// listened for, this never resolves and the run finishes on its own.
#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    async fn recv(handler: Option<&mut Signal>) {
        match handler {
            Some(handler) => {
                handler.recv().await;
            }
            None => std::future::pending().await,
        }
    }

    let mut sigterm = signal(SignalKind::terminate())
        .inspect_err(|e| tracing::warn!(error = %e, "Could not register SIGTERM handler"))
        .ok();
    let mut sigint = signal(SignalKind::interrupt())
        .inspect_err(|e| tracing::warn!(error = %e, "Could not register SIGINT handler"))
        .ok();

    if sigterm.is_none() && sigint.is_none() {
        return wait_for_ctrl_c().await;
    }

    tokio::select! {
        _ = recv(sigterm.as_mut()) => {
            tracing::info!("Received SIGTERM, finishing the current item");
        }
        _ = recv(sigint.as_mut()) => {
            tracing::info!("Received SIGINT, finishing the current item");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, finishing the current item"),
        Err(e) => {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C, run will not be interrupted");
            std::future::pending::<()>().await;
        }
    }
}
