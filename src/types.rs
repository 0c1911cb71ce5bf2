//! Core types for profile-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;
use uuid::Uuid;

/// Unique identifier for a job
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Generate a fresh random JobId
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn get(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for JobId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Job status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created and waiting for a runner
    Queued,
    /// A runner is driving the job
    Running,
    /// Every item was processed
    Completed,
    /// Stopped by the user
    Cancelled,
    /// Discovery exhausted or an unexpected error occurred
    Failed,
}

impl JobStatus {
    /// Whether this status is final
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Cancelled | JobStatus::Failed
        )
    }

    /// Whether moving from `self` to `next` respects
    /// Queued → Running → {Completed | Cancelled | Failed}.
    ///
    /// Cancelled may preempt a Queued job directly.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Queued, JobStatus::Running) => true,
            (JobStatus::Queued, JobStatus::Cancelled) => true,
            (JobStatus::Running, JobStatus::Completed)
            | (JobStatus::Running, JobStatus::Cancelled)
            | (JobStatus::Running, JobStatus::Failed) => true,
            _ => false,
        }
    }

    /// Lowercase name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for creating a job
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct NewJob {
    /// Profile, channel, playlist or single video URL
    pub profile_url: String,

    /// Root directory for downloaded files
    #[schema(value_type = String)]
    pub output_root: PathBuf,

    /// Process at most this many discovered items (None or 0 = unlimited)
    #[serde(default)]
    pub max_videos: Option<usize>,

    /// Proxy URL handed to the extractor
    #[serde(default)]
    pub proxy: Option<String>,
}

/// Point-in-time copy of a job's public fields
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobSnapshot {
    /// Job identifier
    pub id: JobId,

    /// Requested URL
    pub profile_url: String,

    /// Root directory for downloaded files
    #[schema(value_type = String)]
    pub output_root: PathBuf,

    /// Item cap, if any
    pub max_videos: Option<usize>,

    /// Proxy URL, if any
    pub proxy: Option<String>,

    /// Current status
    pub status: JobStatus,

    /// Fraction of known items processed (0.0 to 1.0)
    pub progress: f64,

    /// Number of items discovered (None until discovery completes)
    pub total: Option<usize>,

    /// Items downloaded successfully
    pub downloaded: usize,

    /// Items that could not be downloaded
    pub failed: usize,

    /// Last human-readable status message
    pub message: String,

    /// When the job was created
    pub created_at: DateTime<Utc>,

    /// When the job was last modified
    pub updated_at: DateTime<Utc>,
}

/// Event emitted during the job lifecycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// Job registered
    Created {
        /// Job ID
        id: JobId,
        /// Requested URL
        url: String,
    },

    /// Runner picked the job up
    Started {
        /// Job ID
        id: JobId,
    },

    /// Discovery primary profile failed, trying a fallback
    FallbackProfile {
        /// Job ID
        id: JobId,
        /// Profile name being tried
        profile: String,
        /// 1-based index among the fallbacks
        attempt: usize,
        /// Number of fallbacks available
        of: usize,
    },

    /// Discovery finished
    Discovered {
        /// Job ID
        id: JobId,
        /// Number of items that will be processed
        total: usize,
    },

    /// Rate-limited transfer will be retried
    Retrying {
        /// Job ID
        id: JobId,
        /// 1-based item index
        index: usize,
        /// 1-based attempt number about to run
        attempt: u32,
        /// Wait before the attempt, in seconds
        delay_secs: u64,
    },

    /// One item downloaded
    ItemDownloaded {
        /// Job ID
        id: JobId,
        /// 1-based item index
        index: usize,
    },

    /// One item could not be downloaded
    ItemFailed {
        /// Job ID
        id: JobId,
        /// 1-based item index
        index: usize,
        /// Error message
        error: String,
    },

    /// Job completed
    Completed {
        /// Job ID
        id: JobId,
        /// Items downloaded
        downloaded: usize,
        /// Items failed
        failed: usize,
    },

    /// Job failed
    Failed {
        /// Job ID
        id: JobId,
        /// Failure message
        error: String,
    },

    /// Job cancelled by the user
    Cancelled {
        /// Job ID
        id: JobId,
    },
}

impl JobEvent {
    /// Snake-case event name, used as the SSE event type
    pub fn kind(&self) -> &'static str {
        match self {
            JobEvent::Created { .. } => "created",
            JobEvent::Started { .. } => "started",
            JobEvent::FallbackProfile { .. } => "fallback_profile",
            JobEvent::Discovered { .. } => "discovered",
            JobEvent::Retrying { .. } => "retrying",
            JobEvent::ItemDownloaded { .. } => "item_downloaded",
            JobEvent::ItemFailed { .. } => "item_failed",
            JobEvent::Completed { .. } => "completed",
            JobEvent::Failed { .. } => "failed",
            JobEvent::Cancelled { .. } => "cancelled",
        }
    }

    /// The job this event belongs to
    pub fn job_id(&self) -> JobId {
        match self {
            JobEvent::Created { id, .. }
            | JobEvent::Started { id }
            | JobEvent::FallbackProfile { id, .. }
            | JobEvent::Discovered { id, .. }
            | JobEvent::Retrying { id, .. }
            | JobEvent::ItemDownloaded { id, .. }
            | JobEvent::ItemFailed { id, .. }
            | JobEvent::Completed { id, .. }
            | JobEvent::Failed { id, .. }
            | JobEvent::Cancelled { id } => *id,
        }
    }
}
