//! Fake extractor and media fixtures

use async_trait::async_trait;
use profile_dl::{
    Discovery, Extractor, ExtractorError, ExtractorProfile, FetchProgress, FetchRequest,
    ItemDescriptor,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Bytes written for every fake download
pub const FAKE_MEDIA: &[u8] = b"\x00\x00\x00\x18ftypmp42";

/// A fully described item as the extractor would report it
pub fn video(id: &str, uploader: &str, upload_date: &str) -> ItemDescriptor {
    ItemDescriptor {
        webpage_url: Some(format!("https://www.tiktok.com/@{uploader}/video/{id}")),
        url: None,
        id: Some(id.to_string()),
        uploader: Some(uploader.to_string()),
        upload_date: Some(upload_date.to_string()),
        ext: Some("mp4".to_string()),
        title: Some(format!("Video {id}")),
    }
}

/// Extractor that serves a fixed item list and writes each item to the
/// path the output template resolves to
pub struct FakeExtractor {
    items: Vec<ItemDescriptor>,
    failing: HashMap<String, ExtractorError>,
    fetched: Mutex<Vec<String>>,
}

impl FakeExtractor {
    /// Serve `items` for every URL and profile
    pub fn new(items: Vec<ItemDescriptor>) -> Self {
        Self {
            items,
            failing: HashMap::new(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Make every fetch of `url` fail with `error`
    pub fn failing_item(mut self, url: &str, error: ExtractorError) -> Self {
        self.failing.insert(url.to_string(), error);
        self
    }

    /// URLs fetched so far, in order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn discover(
        &self,
        _url: &str,
        _profile: &ExtractorProfile,
        _proxy: Option<&str>,
    ) -> Result<Discovery, ExtractorError> {
        Ok(Discovery::Collection(self.items.clone()))
    }

    async fn fetch(&self, request: FetchRequest<'_>) -> Result<(), ExtractorError> {
        self.fetched
            .lock()
            .unwrap()
            .push(request.item_url.to_string());

        if let Some(error) = self.failing.get(request.item_url) {
            return Err(error.clone());
        }

        let item = self
            .items
            .iter()
            .find(|item| item.fetch_url() == Some(request.item_url))
            .ok_or_else(|| ExtractorError::Failed(format!("unknown item {}", request.item_url)))?;
        let path = request.output.resolve(item);
        let filename = path.display().to_string();

        if (request.progress)(FetchProgress::Downloading {
            filename: filename.clone(),
        })
        .is_break()
        {
            return Err(ExtractorError::Aborted);
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ExtractorError::Failed(e.to_string()))?;
        }
        tokio::fs::write(&path, FAKE_MEDIA)
            .await
            .map_err(|e| ExtractorError::Failed(e.to_string()))?;

        let _ = (request.progress)(FetchProgress::Finished { filename });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
