//! The job entity: immutable request parameters plus guarded runtime state.

use crate::types::{JobId, JobSnapshot, JobStatus, NewJob};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Mutable part of a job, guarded by the job's mutex
#[derive(Debug)]
struct JobState {
    status: JobStatus,
    progress: f64,
    total: Option<usize>,
    downloaded: usize,
    failed: usize,
    message: String,
    updated_at: DateTime<Utc>,
}

/// A download job
///
/// Shared as `Arc<Job>` between the store, the runner and API handlers.
/// Request parameters never change after creation. Runtime state is only
/// reachable through methods that keep the lifecycle invariants:
///
/// - status only moves Queued → Running → {Completed | Cancelled | Failed},
///   with Cancelled also reachable from Queued
/// - terminal statuses are final
/// - `progress` stays within `[0, 1]`
/// - `updated_at` is bumped on every mutation
#[derive(Debug)]
pub struct Job {
    id: JobId,
    profile_url: String,
    output_root: PathBuf,
    max_videos: Option<usize>,
    proxy: Option<String>,
    created_at: DateTime<Utc>,
    state: Mutex<JobState>,
    cancel_token: CancellationToken,
}

impl Job {
    /// Build a Queued job from an already-normalized request
    pub(crate) fn new(id: JobId, request: NewJob) -> Self {
        let now = Utc::now();
        Self {
            id,
            profile_url: request.profile_url,
            output_root: request.output_root,
            max_videos: request.max_videos,
            proxy: request.proxy,
            created_at: now,
            state: Mutex::new(JobState {
                status: JobStatus::Queued,
                progress: 0.0,
                total: None,
                downloaded: 0,
                failed: 0,
                message: "Queued".to_string(),
                updated_at: now,
            }),
            cancel_token: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, JobState> {
        // State updates are plain field writes, so a poisoned lock still holds consistent data
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Job identifier
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Requested URL
    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }

    /// Root directory for downloaded files
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Item cap, if any
    pub fn max_videos(&self) -> Option<usize> {
        self.max_videos
    }

    /// Proxy URL, if any
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Creation time
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current status
    pub fn status(&self) -> JobStatus {
        self.lock().status
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Token that fires when the job is cancelled
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    /// Point-in-time copy of all public fields
    pub fn snapshot(&self) -> JobSnapshot {
        let state = self.lock();
        JobSnapshot {
            id: self.id,
            profile_url: self.profile_url.clone(),
            output_root: self.output_root.clone(),
            max_videos: self.max_videos,
            proxy: self.proxy.clone(),
            status: state.status,
            progress: state.progress,
            total: state.total,
            downloaded: state.downloaded,
            failed: state.failed,
            message: state.message.clone(),
            created_at: self.created_at,
            updated_at: state.updated_at,
        }
    }

    /// Claim the job for a runner (Queued → Running).
    ///
    /// Returns false when the job was already started, cancelled or finished.
    pub(crate) fn try_start(&self) -> bool {
        let mut state = self.lock();
        if state.status != JobStatus::Queued || self.cancel_token.is_cancelled() {
            return false;
        }
        state.status = JobStatus::Running;
        state.message = "Starting".to_string();
        state.updated_at = Utc::now();
        true
    }

    /// Fire the cancel signal and mark the job Cancelled unless it is terminal.
    ///
    /// Returns true if the status changed.
    pub(crate) fn cancel(&self) -> bool {
        self.cancel_token.cancel();
        self.transition(JobStatus::Cancelled, "Cancelled by user".to_string())
    }

    /// Move a Running job to a terminal status.
    ///
    /// Returns false (and changes nothing) if the transition is not allowed,
    /// e.g. when the job was cancelled while the runner was finishing.
    pub(crate) fn finish(&self, status: JobStatus, message: String) -> bool {
        debug_assert!(status.is_terminal());
        self.transition(status, message)
    }

    fn transition(&self, next: JobStatus, message: String) -> bool {
        let mut state = self.lock();
        if !state.status.can_transition_to(next) {
            return false;
        }
        state.status = next;
        state.message = message;
        state.updated_at = Utc::now();
        true
    }

    /// Overwrite the status message (ignored once terminal)
    pub(crate) fn set_message(&self, message: impl Into<String>) {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return;
        }
        state.message = message.into();
        state.updated_at = Utc::now();
    }

    /// Record the number of items that will be processed
    pub(crate) fn begin_items(&self, total: usize) {
        let mut state = self.lock();
        state.total = Some(total);
        state.progress = 0.0;
        state.updated_at = Utc::now();
    }

    /// One item downloaded
    pub(crate) fn record_downloaded(&self) {
        let mut state = self.lock();
        state.downloaded += 1;
        state.updated_at = Utc::now();
    }

    /// One item could not be downloaded
    pub(crate) fn record_failed(&self) {
        let mut state = self.lock();
        state.failed += 1;
        state.updated_at = Utc::now();
    }

    /// Progress after processing the 1-based item `index`
    pub(crate) fn set_progress(&self, index: usize) {
        let mut state = self.lock();
        state.progress = match state.total {
            Some(total) if total > 0 => (index.min(total) as f64) / (total as f64),
            _ => 0.0,
        };
        state.updated_at = Utc::now();
    }

    /// Items downloaded and failed so far
    pub(crate) fn counts(&self) -> (usize, usize) {
        let state = self.lock();
        (state.downloaded, state.failed)
    }
}
