//! Media extraction backends
//!
//! The job runner never talks to a content platform directly. It asks an
//! [`Extractor`] to turn a URL into item descriptors (discovery) and to
//! transfer single items (fetch), choosing an [`ExtractorProfile`] from the
//! platform's fallback chain.
//!
//! ## Architecture
//!
//! - [`YtDlpExtractor`]: drives the external `yt-dlp` binary
//! - [`NoOpExtractor`]: stub used when yt-dlp is unavailable; every call fails
//!   with `NotSupported`
//!
//! ## Usage
//!
//! ```no_run
//! use profile_dl::extractor::{Extractor, Platform, YtDlpExtractor};
//! use profile_dl::config::DownloadConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = YtDlpExtractor::from_path().expect("yt-dlp not found");
//!     let url = "https://www.youtube.com/@channel";
//!     let chain = Platform::classify(url).profile_chain(&DownloadConfig::default());
//!
//!     let items = extractor.discover(url, &chain[0], None).await?.into_items();
//!     println!("found {} items", items.len());
//!     Ok(())
//! }
//! ```

mod noop;
mod profile;
mod template;
mod traits;
mod ytdlp;

pub use noop::NoOpExtractor;
pub use profile::{ExtractorProfile, Platform, SleepPolicy};
pub use template::OutputTemplate;
pub use traits::{
    Discovery, Extractor, FetchProgress, FetchRequest, ItemDescriptor, ProgressSink,
};
pub use ytdlp::{YtDlpExtractor, profile_args};
