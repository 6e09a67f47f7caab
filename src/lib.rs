//! # pullbox-dl
//!
//! Async driver for the `yt-dlp` command-line downloader.
//!
//! ## Design Philosophy
//!
//! pullbox-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **Honest about progress** - Percentages never go backwards within an item,
//!   and success is decided by the exit status alone
//!
//! The crate has two halves. The [`command`] module turns a [`DownloadRequest`]
//! into an argument vector. The [`progress`] module folds the process output,
//! delivered in arbitrary chunks, into a running [`ProgressSnapshot`].
//! [`Downloader`] ties both to a child process.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pullbox_dl::{Config, DownloadRequest, Downloader, Event};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = Downloader::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let Event::Progress { snapshot, .. } = event {
//!                 println!("{:.1}% at {} (ETA {})", snapshot.percentage, snapshot.speed, snapshot.eta);
//!             }
//!         }
//!     });
//!
//!     let request = DownloadRequest::builder("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
//!         .output_directory("downloads")
//!         .audio_only(true)
//!         .build()?;
//!     downloader.start_download(request).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Argument vectors for yt-dlp invocations
pub mod command;
/// Configuration types
pub mod config;
/// Download jobs and metadata probes
pub mod downloader;
/// Error types
pub mod error;
/// Child process execution and binary discovery
pub mod process;
/// Progress reconciliation
pub mod progress;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use downloader::Downloader;
pub use error::{Error, ErrorCategory, ErrorDetail, Result};
pub use process::{ProcessExecutor, TokioProcessExecutor};
pub use progress::{ProgressReconciler, ProgressUpdate};
pub use types::{
    DownloadOptions, DownloadRequest, DownloadRequestBuilder, DownloadResult, Event, FormatInfo,
    FormatSelection, MediaInfo, PlaylistEntry, PlaylistInfo, ProgressSnapshot,
};

/// Helper function to run the downloader with graceful signal handling.
///
/// Waits for a termination signal and then cancels the running download, if any.
/// The cancelled job resolves with [`Error::Cancelled`] on its own task.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use pullbox_dl::{Config, DownloadRequest, Downloader, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = Downloader::new(Config::default())?;
///     let request = DownloadRequest::builder("https://example.com/video").build()?;
///
///     let job = {
///         let downloader = downloader.clone();
///         tokio::spawn(async move { downloader.start_download(request).await })
///     };
///
///     // Run with automatic signal handling
///     run_with_shutdown(downloader).await?;
///     job.await??;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: Downloader) -> Result<()> {
    wait_for_signal().await;
    if !downloader.cancel() {
        tracing::info!("No active download to cancel");
    }
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments; fall back to ctrl_c
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        (term, int) => {
            if let Err(e) = term.and(int) {
                tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            }
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received Ctrl+C signal");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
        _ = sigint.recv() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        return;
    }
    tracing::info!("Received Ctrl+C signal");
}
