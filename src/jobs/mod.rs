//! Job lifecycle management split into focused submodules.
//!
//! The [`JobManager`] façade and its methods are organized by concern:
//! - [`job`] - The job entity and its guarded state
//! - [`store`] - In-memory registry of jobs
//! - [`control`] - Create, query and cancel
//! - [`runner`] - Drives one job from Queued to a terminal status

mod control;
pub mod job;
mod runner;
pub mod store;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use job::Job;
pub use store::JobStore;

use crate::config::Config;
use crate::extractor::{Extractor, NoOpExtractor, YtDlpExtractor};
use crate::types::JobEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Job manager (cloneable - all fields are Arc-wrapped)
///
/// Creates jobs, schedules their runners, cancels and reports on them.
/// Clones share the same store, extractor and event channel.
#[derive(Clone)]
pub struct JobManager {
    /// Registry of every job created by this manager
    pub(crate) store: Arc<JobStore>,
    /// Discovery and transfer backend (trait object for pluggable implementations)
    pub(crate) extractor: Arc<dyn Extractor>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<JobEvent>,
}

impl JobManager {
    /// Create a manager with an empty store and the extractor selected from
    /// `config.tools`
    ///
    /// Selection order: explicit `ytdlp_path`, then a PATH lookup when
    /// `search_path` is enabled, then [`NoOpExtractor`].
    pub fn new(config: Config) -> Self {
        let extractor: Arc<dyn Extractor> = if let Some(ref path) = config.tools.ytdlp_path {
            Arc::new(YtDlpExtractor::new(path.clone()))
        } else if config.tools.search_path {
            YtDlpExtractor::from_path()
                .map(|e| Arc::new(e) as Arc<dyn Extractor>)
                .unwrap_or_else(|| Arc::new(NoOpExtractor))
        } else {
            Arc::new(NoOpExtractor)
        };

        tracing::info!(extractor = extractor.name(), "Extractor initialized");
        if extractor.name() == "noop" {
            tracing::warn!("yt-dlp not found; every job will fail until it is installed");
        }

        Self::with_components(config, Arc::new(JobStore::new()), extractor)
    }

    /// Create a manager from explicit parts
    pub fn with_components(
        config: Config,
        store: Arc<JobStore>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(config.server.api.event_buffer.max(1));
        Self {
            store,
            extractor,
            config: Arc::new(config),
            event_tx,
        }
    }

    /// Subscribe to job lifecycle events
    ///
    /// Events are advisory; slow subscribers may miss some
    /// (`RecvError::Lagged`). The job record stays the source of truth.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the extractor in use
    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Serve the REST API on `server.api.bind_address` in a background task
    ///
    /// The task runs until the server fails or is aborted through the
    /// returned handle.
    pub fn spawn_api_server(&self) -> tokio::task::JoinHandle<crate::Result<()>> {
        let manager = self.clone();
        let config = self.config.clone();
        tokio::spawn(async move { crate::api::start_api_server(manager, config).await })
    }

    pub(crate) fn emit(&self, event: JobEvent) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }
}
