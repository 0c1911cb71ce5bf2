//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] - Create, inspect and cancel jobs
//! - [`system`] - Health, events, OpenAPI

use crate::types::{JobId, NewJob};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

mod jobs;
mod system;

pub use jobs::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /jobs
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateJobRequest {
    /// Profile, channel, playlist or single-video URL
    #[serde(default)]
    pub profile_url: String,

    /// Root directory for downloaded files (default: `download.default_output_root`)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub output_root: Option<PathBuf>,

    /// Maximum number of items to download. Accepts a number or a numeric
    /// string; blank, zero or unparsable values mean unlimited.
    #[serde(default, deserialize_with = "lenient_count")]
    #[schema(value_type = Option<String>, example = "5")]
    pub max_videos: Option<usize>,

    /// Proxy URL passed to the extractor
    #[serde(default)]
    pub proxy: Option<String>,

    /// Expected platform (`youtube`, `instagram`, `tiktok`); must match the URL
    #[serde(default)]
    pub platform: Option<String>,
}

impl CreateJobRequest {
    pub(crate) fn into_new_job(self) -> NewJob {
        NewJob {
            profile_url: self.profile_url,
            output_root: self.output_root.unwrap_or_default(),
            max_videos: self.max_videos,
            proxy: self.proxy,
        }
    }
}

/// Response for POST /jobs
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateJobResponse {
    /// Identifier of the new job
    pub job_id: JobId,
}

/// Response for POST /jobs/:id/cancel
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CancelJobResponse {
    /// Always `"cancelled"`
    pub status: String,
}

/// Form fields arrive as strings more often than not
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
