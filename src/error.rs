//! Error types for profile-dl
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Job, Extractor, Config, etc.)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use crate::types::JobId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for profile-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for profile-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "YTDLP_CONCURRENCY")
        key: Option<String>,
    },

    /// Job registry error
    #[error("job error: {0}")]
    Job(#[from] JobError),

    /// Extractor (discovery or transfer) error
    #[error("extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Invalid request input
    #[error("validation error: {0}")]
    Validation(String),

    /// The job was cancelled while the operation was in progress
    #[error("job cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Job registry errors
#[derive(Debug, Error)]
pub enum JobError {
    /// No job with this id exists in the store
    #[error("job {id} not found")]
    NotFound {
        /// The job ID that was not found
        id: JobId,
    },

    /// A job with this id is already registered
    #[error("job {id} already exists")]
    AlreadyExists {
        /// The duplicated job ID
        id: JobId,
    },
}

/// Errors reported by an [`Extractor`](crate::extractor::Extractor)
#[derive(Debug, Clone, Error)]
pub enum ExtractorError {
    /// The extractor ran and reported a failure (stderr / error text)
    #[error("{0}")]
    Failed(String),

    /// The transfer was stopped because the progress sink asked to abort
    #[error("transfer aborted by progress checkpoint")]
    Aborted,

    /// The extractor could not be executed at all
    #[error("failed to execute extractor: {0}")]
    Spawn(String),

    /// The extractor produced output that could not be understood
    #[error("unexpected extractor output: {0}")]
    InvalidOutput(String),

    /// No extractor is available
    #[error("{0}")]
    NotSupported(String),
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "job_not_found",
///     "message": "job error: job 6f1c... not found",
///     "details": {
///       "job_id": "6f1c..."
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,

            // 404 Not Found
            Error::Job(JobError::NotFound { .. }) => 404,

            // 409 Conflict
            Error::Job(JobError::AlreadyExists { .. }) => 409,
            Error::Cancelled => 409,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // 501 Not Implemented - Feature not supported
            Error::Extractor(ExtractorError::NotSupported(_)) => 501,

            // 502 Bad Gateway - External tool reported a failure
            Error::Extractor(_) => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Job(e) => match e {
                JobError::NotFound { .. } => "job_not_found",
                JobError::AlreadyExists { .. } => "job_already_exists",
            },
            Error::Extractor(e) => match e {
                ExtractorError::Failed(_) => "extractor_failed",
                ExtractorError::Aborted => "extractor_aborted",
                ExtractorError::Spawn(_) => "extractor_unavailable",
                ExtractorError::InvalidOutput(_) => "extractor_invalid_output",
                ExtractorError::NotSupported(_) => "not_supported",
            },
            Error::Validation(_) => "validation_error",
            Error::Cancelled => "cancelled",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Job(JobError::NotFound { id }) | Error::Job(JobError::AlreadyExists { id }) => {
                Some(serde_json::json!({
                    "job_id": id,
                }))
            }
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every
    /// reachable match arm in ToHttpStatus.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        let id = JobId::new();
        vec![
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("YTDLP_CONCURRENCY".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::Validation("empty url".into()),
                400,
                "validation_error",
            ),
            (
                Error::Job(JobError::NotFound { id }),
                404,
                "job_not_found",
            ),
            (
                Error::Job(JobError::AlreadyExists { id }),
                409,
                "job_already_exists",
            ),
            (Error::Cancelled, 409, "cancelled"),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (
                Error::Extractor(ExtractorError::Failed("HTTP Error 404".into())),
                502,
                "extractor_failed",
            ),
            (
                Error::Extractor(ExtractorError::Aborted),
                502,
                "extractor_aborted",
            ),
            (
                Error::Extractor(ExtractorError::Spawn("no such file".into())),
                502,
                "extractor_unavailable",
            ),
            (
                Error::Extractor(ExtractorError::InvalidOutput("not json".into())),
                502,
                "extractor_invalid_output",
            ),
            (
                Error::Extractor(ExtractorError::NotSupported("yt-dlp missing".into())),
                501,
                "not_supported",
            ),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_status_and_code() {
        for (error, expected_status, expected_code) in all_error_variants() {
            assert_eq!(
                error.status_code(),
                expected_status,
                "error_code={expected_code} returned the wrong status"
            );
            assert_eq!(error.error_code(), expected_code);
        }
    }

    #[test]
    fn not_found_carries_job_id_detail() {
        let id = JobId::new();
        let api_error: ApiError = Error::Job(JobError::NotFound { id }).into();

        assert_eq!(api_error.error.code, "job_not_found");
        assert!(api_error.error.message.contains(&id.to_string()));
        let details = api_error.error.details.unwrap();
        assert_eq!(details["job_id"], id.to_string());
    }

    #[test]
    fn config_error_carries_key_detail() {
        let api_error: ApiError = Error::Config {
            message: "not a number".into(),
            key: Some("YTDLP_CONCURRENCY".into()),
        }
        .into();

        assert_eq!(api_error.error.code, "config_error");
        assert_eq!(api_error.error.details.unwrap()["key"], "YTDLP_CONCURRENCY");
    }

    #[test]
    fn errors_without_context_have_no_details() {
        let api_error: ApiError = Error::Cancelled.into();
        assert!(api_error.error.details.is_none());

        let json = serde_json::to_value(&api_error).unwrap();
        assert!(json["error"].get("details").is_none());
    }

    #[test]
    fn extractor_failure_message_is_preserved() {
        let error = Error::Extractor(ExtractorError::Failed(
            "ERROR: [youtube] abc: Sign in to confirm your age".into(),
        ));
        assert!(error.to_string().contains("Sign in to confirm your age"));
    }
}
