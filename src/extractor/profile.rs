//! Platform classification and extractor profiles
//!
//! Each platform has an ordered chain of [`ExtractorProfile`]s. The first
//! entry is the primary profile; the rest are fallbacks tried in order when
//! discovery fails. Profiles are never merged.

use crate::config::DownloadConfig;
use serde::Serialize;
use std::time::Duration;

/// Desktop Chrome user agent sent to YouTube
const CHROME_122_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Desktop Chrome user agent sent to Instagram
const CHROME_91_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Platforms with dedicated handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// YouTube (`youtube.com`, `youtu.be`)
    YouTube,
    /// Instagram (`instagram.com`)
    Instagram,
    /// Everything else (TikTok and any site the extractor supports)
    Default,
}

impl Platform {
    /// Classify a URL by case-insensitive domain substring
    pub fn classify(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains("instagram.com") {
            Platform::Instagram
        } else if lower.contains("youtube.com") || lower.contains("youtu.be") {
            Platform::YouTube
        } else {
            Platform::Default
        }
    }

    /// Parse a platform name as accepted by the API (`youtube`, `instagram`,
    /// `tiktok`/`default`/`other`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "youtube" => Some(Platform::YouTube),
            "instagram" => Some(Platform::Instagram),
            "tiktok" | "default" | "other" => Some(Platform::Default),
            _ => None,
        }
    }

    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::YouTube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Default => "default",
        }
    }

    /// Pause between items, for platforms that throttle bursts
    pub fn item_cooldown(&self, config: &DownloadConfig) -> Option<Duration> {
        match self {
            Platform::YouTube => Some(config.item_cooldown),
            Platform::Instagram | Platform::Default => None,
        }
    }

    /// Message recorded when every profile fails discovery
    pub fn discovery_diagnostic(&self) -> &'static str {
        match self {
            Platform::YouTube => {
                "YouTube has updated its system; try updating yt-dlp (pip install -U yt-dlp)"
            }
            Platform::Instagram | Platform::Default => {
                "Could not access the content. Possible causes: private video, \
                 region-restricted, removed, or incorrect URL."
            }
        }
    }

    /// Ordered profile chain: primary first, then fallbacks
    pub fn profile_chain(&self, config: &DownloadConfig) -> Vec<ExtractorProfile> {
        match self {
            Platform::YouTube => vec![
                ExtractorProfile::youtube_primary(),
                ExtractorProfile::youtube_android(),
                ExtractorProfile::youtube_ios(),
                ExtractorProfile::minimal(),
            ],
            Platform::Instagram => vec![
                ExtractorProfile::instagram_primary(),
                ExtractorProfile::minimal(),
            ],
            Platform::Default => vec![
                ExtractorProfile::default_primary(config.concurrent_fragment_downloads),
                ExtractorProfile::minimal(),
            ],
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request pacing applied by the extractor itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SleepPolicy {
    /// Minimum seconds to sleep before each download
    pub interval_secs: u32,
    /// Maximum seconds to sleep before each download
    pub max_interval_secs: u32,
    /// Seconds to sleep between metadata requests
    pub requests_secs: u32,
}

/// A named bundle of extractor settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractorProfile {
    /// Name used in logs and fallback messages
    pub name: &'static str,
    /// Format selector
    pub format: String,
    /// Container for merged audio/video streams
    pub merge_output_format: Option<String>,
    /// Extractor-level HTTP retries
    pub retries: Option<u32>,
    /// Extractor-level fragment retries
    pub fragment_retries: Option<u32>,
    /// Treat playlist URLs as a single item
    pub no_playlist: bool,
    /// Skip unavailable entries instead of failing the whole collection
    pub ignore_errors: bool,
    /// Concurrent fragment downloads
    pub concurrent_fragments: Option<u32>,
    /// Request pacing
    pub sleep: Option<SleepPolicy>,
    /// Extra HTTP headers, in order
    pub headers: Vec<(String, String)>,
    /// Platform-specific extractor arguments (`extractor:key=value;...`)
    pub extractor_args: Option<String>,
    /// Verify TLS certificates
    pub check_certificates: bool,
}

impl ExtractorProfile {
    fn base(name: &'static str, format: &str) -> Self {
        Self {
            name,
            format: format.to_string(),
            merge_output_format: None,
            retries: None,
            fragment_retries: None,
            no_playlist: true,
            ignore_errors: true,
            concurrent_fragments: None,
            sleep: None,
            headers: Vec::new(),
            extractor_args: None,
            check_certificates: true,
        }
    }

    /// YouTube primary: mobile clients first, paced requests
    pub fn youtube_primary() -> Self {
        Self {
            merge_output_format: Some("mp4".into()),
            retries: Some(5),
            fragment_retries: Some(10),
            sleep: Some(SleepPolicy {
                interval_secs: 3,
                max_interval_secs: 10,
                requests_secs: 2,
            }),
            headers: headers(&[
                ("User-Agent", CHROME_122_UA),
                (
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,\
                     image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
                ),
                ("Accept-Language", "en-US,en;q=0.9"),
                ("Accept-Encoding", "gzip, deflate, br"),
                ("Connection", "keep-alive"),
                ("Upgrade-Insecure-Requests", "1"),
                ("Sec-Fetch-Dest", "document"),
                ("Sec-Fetch-Mode", "navigate"),
                ("Sec-Fetch-Site", "none"),
                ("Sec-Fetch-User", "?1"),
                (
                    "sec-ch-ua",
                    "\"Chromium\";v=\"122\", \"Not(A:Brand\";v=\"24\", \"Google Chrome\";v=\"122\"",
                ),
                ("sec-ch-ua-mobile", "?0"),
                ("sec-ch-ua-platform", "\"Windows\""),
            ]),
            extractor_args: Some(
                "youtube:player_client=android,android_embedded,ios,ios_embedded,web,mweb,\
                 tv_embedded;player_skip=webpage,configs;skip=hls;comment_sort=top;\
                 max_comments=0"
                    .into(),
            ),
            check_certificates: false,
            ..Self::base("youtube", "best[height<=720]/best")
        }
    }

    /// YouTube fallback: Android client only, lower resolution
    pub fn youtube_android() -> Self {
        Self {
            extractor_args: Some("youtube:player_client=android;player_skip=webpage".into()),
            ..Self::base("youtube-android", "best[height<=480]/best")
        }
    }

    /// YouTube fallback: iOS client only, any quality
    pub fn youtube_ios() -> Self {
        Self {
            extractor_args: Some("youtube:player_client=ios".into()),
            ..Self::base("youtube-ios", "worst/best")
        }
    }

    /// Instagram primary: single post, desktop browser headers
    pub fn instagram_primary() -> Self {
        Self {
            merge_output_format: Some("mp4".into()),
            retries: Some(3),
            fragment_retries: Some(5),
            headers: headers(&[
                ("User-Agent", CHROME_91_UA),
                (
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                ),
                ("Accept-Language", "en-us,en;q=0.5"),
                ("Accept-Encoding", "gzip,deflate"),
                ("Accept-Charset", "ISO-8859-1,utf-8;q=0.7,*;q=0.7"),
                ("Keep-Alive", "300"),
                ("Connection", "keep-alive"),
            ]),
            extractor_args: Some("instagram:api_version=v1".into()),
            ..Self::base("instagram", "best[height<=720]")
        }
    }

    /// Primary profile for other platforms: whole profile, best audio+video
    pub fn default_primary(concurrent_fragments: u32) -> Self {
        Self {
            merge_output_format: Some("mp4".into()),
            retries: Some(5),
            fragment_retries: Some(10),
            no_playlist: false,
            concurrent_fragments: Some(concurrent_fragments.max(1)),
            ..Self::base("default", "bv*+ba/b")
        }
    }

    /// Last-resort fallback with no platform tuning
    pub fn minimal() -> Self {
        Self::base("minimal", "best")
    }
}

fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
