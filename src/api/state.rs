//! Application state for the API server

use crate::{Config, JobManager};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request; the manager is itself a cheap Arc-backed handle.
#[derive(Clone)]
pub struct AppState {
    /// Job manager that owns the store, extractor and event channel
    pub manager: JobManager,

    /// Configuration (read-only for handlers)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(manager: JobManager, config: Arc<Config>) -> Self {
        Self { manager, config }
    }
}
