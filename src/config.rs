//! Configuration types for profile-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Environment variable overriding [`DownloadConfig::default_output_root`]
pub const ENV_OUTPUT_ROOT: &str = "PROFILE_DL_OUTPUT_ROOT";
/// Environment variable overriding [`DownloadConfig::concurrent_fragment_downloads`]
pub const ENV_YTDLP_CONCURRENCY: &str = "YTDLP_CONCURRENCY";
/// Environment variable overriding [`ToolsConfig::ytdlp_path`]
pub const ENV_YTDLP_PATH: &str = "YTDLP_PATH";
/// Environment variable overriding [`ApiConfig::bind_address`]
pub const ENV_BIND_ADDRESS: &str = "PROFILE_DL_BIND_ADDRESS";

/// Download behavior configuration (output location, extractor pacing)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadConfig {
    /// Output root used when a request does not name one
    /// (default: `<Desktop>/TikTokDownloads`)
    #[serde(default = "default_output_root")]
    #[schema(value_type = String)]
    pub default_output_root: PathBuf,

    /// Concurrent fragment downloads handed to the extractor for
    /// platforms without a dedicated profile (default: 2)
    #[serde(default = "default_concurrent_fragments")]
    pub concurrent_fragment_downloads: u32,

    /// Pause between items on rate-limit-sensitive platforms (default: 2 seconds)
    #[serde(default = "default_item_cooldown", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub item_cooldown: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            default_output_root: default_output_root(),
            concurrent_fragment_downloads: default_concurrent_fragments(),
            item_cooldown: default_item_cooldown(),
        }
    }
}

/// Retry configuration for rate-limited transfers
///
/// The wait before attempt `n` (0-based, `n > 0`) is
/// `initial_delay * backoff_multiplier^n`, capped at `max_delay`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RetryConfig {
    /// Total number of attempts per item, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay (default: 5 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub initial_delay: Duration,

    /// Maximum delay between attempts (default: 120 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 3.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: false,
        }
    }
}

/// External tool configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// API and external server integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Capacity of the job event broadcast channel (default: 1000)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            event_buffer: default_event_buffer(),
        }
    }
}

/// Main configuration for the job manager and its API
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Output location and extractor pacing
    #[serde(default)]
    pub download: DownloadConfig,

    /// Rate-limit retry behavior
    #[serde(default)]
    pub retry: RetryConfig,

    /// External tool paths
    #[serde(default)]
    pub tools: ToolsConfig,

    /// REST API settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Output root used when a request does not name one
    pub fn default_output_root(&self) -> &PathBuf {
        &self.download.default_output_root
    }

    /// Apply overrides from the process environment.
    ///
    /// Recognized variables: `PROFILE_DL_OUTPUT_ROOT`, `YTDLP_CONCURRENCY`,
    /// `YTDLP_PATH`, `PROFILE_DL_BIND_ADDRESS`. Empty values are ignored.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(root) = env_value(ENV_OUTPUT_ROOT) {
            self.download.default_output_root = PathBuf::from(root);
        }

        if let Some(raw) = env_value(ENV_YTDLP_CONCURRENCY) {
            self.download.concurrent_fragment_downloads =
                raw.parse().map_err(|_| Error::Config {
                    message: format!("expected a positive integer, got '{}'", raw),
                    key: Some(ENV_YTDLP_CONCURRENCY.to_string()),
                })?;
        }

        if let Some(path) = env_value(ENV_YTDLP_PATH) {
            self.tools.ytdlp_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = env_value(ENV_BIND_ADDRESS) {
            self.server.api.bind_address = raw.parse().map_err(|_| Error::Config {
                message: format!("expected a socket address, got '{}'", raw),
                key: Some(ENV_BIND_ADDRESS.to_string()),
            })?;
        }

        Ok(())
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_output_root() -> PathBuf {
    let base = directories::UserDirs::new()
        .and_then(|dirs| dirs.desktop_dir().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("downloads"));
    base.join("TikTokDownloads")
}

fn default_concurrent_fragments() -> u32 {
    2
}

fn default_item_cooldown() -> Duration {
    Duration::from_secs(2)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(120)
}

fn default_backoff_multiplier() -> f64 {
    3.0
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_event_buffer() -> usize {
    1000
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
