//! No-op extractor for graceful degradation

use super::profile::ExtractorProfile;
use super::traits::{Discovery, Extractor, FetchRequest};
use crate::error::ExtractorError;
use async_trait::async_trait;

const UNAVAILABLE: &str = "media extraction requires the yt-dlp binary. \
     Configure tools.ytdlp_path or ensure yt-dlp is in PATH.";

/// Extractor used when no yt-dlp binary is available or configured
///
/// Every call fails with [`ExtractorError::NotSupported`], so jobs still run
/// through their lifecycle and end Failed with a clear diagnostic.
pub struct NoOpExtractor;

#[async_trait]
impl Extractor for NoOpExtractor {
    async fn discover(
        &self,
        _url: &str,
        _profile: &ExtractorProfile,
        _proxy: Option<&str>,
    ) -> Result<Discovery, ExtractorError> {
        Err(ExtractorError::NotSupported(UNAVAILABLE.into()))
    }

    async fn fetch(&self, _request: FetchRequest<'_>) -> Result<(), ExtractorError> {
        Err(ExtractorError::NotSupported(UNAVAILABLE.into()))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
