//! Output path layout for downloaded items

use super::traits::ItemDescriptor;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Placeholder for metadata the extractor did not provide
const MISSING: &str = "NA";

/// Output layout `<root>/<uploader>/<YYYY-MM-DD>_<id>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    root: PathBuf,
}

impl OutputTemplate {
    /// Relative template in yt-dlp's output template syntax
    pub const PATTERN: &'static str = "%(uploader)s/%(upload_date>%Y-%m-%d)s_%(id)s.%(ext)s";

    /// Template rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full template path passed to the extractor's `-o` option
    pub fn pattern(&self) -> PathBuf {
        self.root.join(Self::PATTERN)
    }

    /// Where `item` will land
    pub fn resolve(&self, item: &ItemDescriptor) -> PathBuf {
        let uploader = component(item.uploader.as_deref());
        let date = item
            .upload_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| MISSING.to_string());
        let id = component(item.id.as_deref());
        let ext = component(item.ext.as_deref());

        self.root
            .join(uploader)
            .join(format!("{}_{}.{}", date, id, ext))
    }
}

/// A single path component from untrusted metadata, never empty, `.` or `..`
fn component(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return MISSING.to_string();
    };
    if value.chars().all(|c| c == '.') {
        return "_".repeat(value.len());
    }
    value
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}
