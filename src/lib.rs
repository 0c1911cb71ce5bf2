//! # profile-dl
//!
//! Asynchronous job manager for downloading the media of social-media
//! profiles, channels, playlists and single videos.
//!
//! A job takes a URL, discovers the items behind it through an
//! [`Extractor`] (by default the `yt-dlp` binary), then downloads them one by
//! one into `<output_root>/<uploader>/<YYYY-MM-DD>_<id>.<ext>`. Jobs report
//! progress through snapshots and a broadcast event stream, retry rate-limited
//! items with exponential backoff, fall back to alternative extractor profiles
//! when discovery fails, and can be cancelled at any time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use profile_dl::{Config, JobManager, NewJob};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = JobManager::new(Config::default());
//!
//!     // Subscribe to events
//!     let mut events = manager.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let job = manager
//!         .create(NewJob {
//!             profile_url: "https://www.tiktok.com/@someone".into(),
//!             max_videos: Some(5),
//!             ..Default::default()
//!         })
//!         .await?;
//!     manager.run(job.id()).await;
//!
//!     println!("{:?}", job.snapshot());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Media discovery and transfer backends
pub mod extractor;
/// Job entity, store, manager and runner
pub mod jobs;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Error, ErrorDetail, ExtractorError, JobError, Result, ToHttpStatus};
pub use extractor::{
    Discovery, Extractor, ExtractorProfile, FetchProgress, FetchRequest, ItemDescriptor,
    NoOpExtractor, OutputTemplate, Platform, YtDlpExtractor,
};
pub use jobs::{Job, JobManager, JobStore};
pub use types::{JobEvent, JobId, JobSnapshot, JobStatus, NewJob};

/// Run until a termination signal arrives, then cancel all unfinished jobs.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use profile_dl::{Config, JobManager, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let manager = JobManager::new(Config::default());
///     let _server = manager.spawn_api_server();
///
///     // Run with automatic signal handling
///     run_with_shutdown(manager).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(manager: JobManager) -> Result<()> {
    wait_for_signal().await;
    manager.shutdown();
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
