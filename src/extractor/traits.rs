//! Traits and types for media extraction

use super::profile::ExtractorProfile;
use super::template::OutputTemplate;
use crate::error::ExtractorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::sync::Arc;

/// One downloadable item found during discovery
///
/// Field names follow the extractor's metadata keys. Every field is
/// optional; items without a fetchable URL are counted as failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Canonical page URL of the item
    #[serde(default)]
    pub webpage_url: Option<String>,
    /// Direct or relative URL of the item
    #[serde(default)]
    pub url: Option<String>,
    /// Platform-assigned item id
    #[serde(default)]
    pub id: Option<String>,
    /// Uploader / account name
    #[serde(default)]
    pub uploader: Option<String>,
    /// Upload date as `YYYYMMDD`
    #[serde(default)]
    pub upload_date: Option<String>,
    /// File extension of the best format
    #[serde(default)]
    pub ext: Option<String>,
    /// Item title
    #[serde(default)]
    pub title: Option<String>,
}

impl ItemDescriptor {
    /// URL to hand to [`Extractor::fetch`]: `webpage_url`, else `url`,
    /// ignoring blank values
    pub fn fetch_url(&self) -> Option<&str> {
        [&self.webpage_url, &self.url]
            .into_iter()
            .filter_map(|u| u.as_deref())
            .map(str::trim)
            .find(|u| !u.is_empty())
    }
}

/// Result of discovery
#[derive(Debug, Clone, PartialEq)]
pub enum Discovery {
    /// The URL points at a single item
    Single(ItemDescriptor),
    /// The URL points at a profile, channel or playlist
    Collection(Vec<ItemDescriptor>),
}

impl Discovery {
    /// Items in discovery order
    pub fn into_items(self) -> Vec<ItemDescriptor> {
        match self {
            Discovery::Single(item) => vec![item],
            Discovery::Collection(items) => items,
        }
    }
}

/// Progress reported while fetching an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchProgress {
    /// Bytes are being transferred into `filename`
    Downloading {
        /// Destination file
        filename: String,
    },
    /// `filename` is complete
    Finished {
        /// Final file
        filename: String,
    },
}

/// Progress callback handed to [`Extractor::fetch`]
///
/// Returning [`ControlFlow::Break`] asks the extractor to stop the transfer,
/// which then fails with [`ExtractorError::Aborted`].
pub type ProgressSink = Arc<dyn Fn(FetchProgress) -> ControlFlow<()> + Send + Sync>;

/// Parameters for a single item transfer
#[derive(Clone)]
pub struct FetchRequest<'a> {
    /// URL of the item (from [`ItemDescriptor::fetch_url`])
    pub item_url: &'a str,
    /// Profile driving format selection and network behavior
    pub profile: &'a ExtractorProfile,
    /// Where the file lands
    pub output: &'a OutputTemplate,
    /// Optional proxy URL
    pub proxy: Option<&'a str>,
    /// Progress checkpoint
    pub progress: ProgressSink,
}

impl std::fmt::Debug for FetchRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRequest")
            .field("item_url", &self.item_url)
            .field("profile", &self.profile.name)
            .field("output", &self.output)
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

/// Trait for media extraction backends
///
/// Implementations turn a URL into item descriptors and transfer single
/// items to disk. The job runner owns retry, fallback and cancellation
/// policy; implementations should report failures as-is.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Resolve `url` into the items it contains using `profile`
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be accessed with this profile, the
    /// backend cannot be executed, or its output cannot be parsed.
    async fn discover(
        &self,
        url: &str,
        profile: &ExtractorProfile,
        proxy: Option<&str>,
    ) -> Result<Discovery, ExtractorError>;

    /// Download one item, reporting progress through `request.progress`
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::Aborted`] when the progress sink breaks,
    /// otherwise the backend's failure message.
    async fn fetch(&self, request: FetchRequest<'_>) -> Result<(), ExtractorError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
