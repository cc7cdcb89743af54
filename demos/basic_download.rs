//! Basic download example
//!
//! This example demonstrates the core functionality of playlist-dl:
//! - Building a configuration
//! - Creating a downloader instance
//! - Subscribing to events
//! - Running a playlist with Ctrl+C handling
//!
//! ```bash
//! cargo run --example basic_download -- "https://www.youtube.com/playlist?list=PL123"
//! ```
//!
//! Running it twice against the same URL skips everything fetched the first time.

use playlist_dl::config::{Config, DownloadConfig};
use playlist_dl::{Event, ItemOutcome, PlaylistDownloader, run_until_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let url = std::env::args()
        .nth(1)
        .ok_or("usage: basic_download <playlist-or-video-url>")?;

    // Build configuration
    let config = Config {
        download: DownloadConfig {
            download_dir: "downloads".into(),
            format: "bestvideo[height<=1080]+bestaudio/best".into(),
            ..Default::default()
        },
        ..Default::default()
    };

    // Create downloader instance
    let downloader = PlaylistDownloader::new(config).await?;

    // Subscribe to events
    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Resolved {
                    title,
                    items,
                    from_cache,
                    ..
                } => {
                    let source = if from_cache { "cache" } else { "yt-dlp" };
                    println!("Resolved '{}' with {} items (from {})", title, items, source);
                }
                Event::ItemFinished { title, outcome, .. } => match outcome {
                    ItemOutcome::Failed { reason } => println!("✗ {}: {}", title, reason),
                    other => println!("✓ {}: {}", title, other.as_str()),
                },
                Event::RunComplete { .. } => {}
            }
        }
    });

    // Ctrl+C stops after the current item; the next run picks up the rest
    let summary = run_until_signal(&downloader, &url).await?;
    println!("{}", summary);

    downloader.shutdown().await;
    Ok(())
}
