//! Shared test helpers: a scripted extractor and manager construction.

use crate::config::Config;
use crate::error::ExtractorError;
use crate::extractor::{
    Discovery, Extractor, ExtractorProfile, FetchProgress, FetchRequest, ItemDescriptor,
};
use crate::jobs::{Job, JobManager, JobStore};
use crate::types::NewJob;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Notify;
use tokio::time::Instant;

/// One recorded `fetch` call
#[derive(Debug, Clone)]
pub(crate) struct FetchCall {
    pub(crate) url: String,
    pub(crate) profile: &'static str,
    pub(crate) at: Instant,
}

/// Pauses every fetch after its first progress report until released
pub(crate) struct FetchGate {
    /// Notified when a fetch reaches the gate
    pub(crate) entered: Notify,
    /// Notify once per fetch to let it continue
    pub(crate) release: Notify,
}

/// Extractor whose behavior is scripted per profile and per item URL
///
/// - discovery: per-profile result, else the default item list, else failure
/// - fetch: queued results per URL, `Ok(())` once the queue is empty
pub(crate) struct ScriptedExtractor {
    default_items: Option<Vec<ItemDescriptor>>,
    discoveries: Mutex<HashMap<&'static str, Result<Discovery, ExtractorError>>>,
    fetch_script: Mutex<HashMap<String, VecDeque<Result<(), ExtractorError>>>>,
    gate: Option<Arc<FetchGate>>,
    pub(crate) discover_calls: Mutex<Vec<&'static str>>,
    pub(crate) fetch_calls: Mutex<Vec<FetchCall>>,
}

impl ScriptedExtractor {
    /// Every profile discovers a collection of `urls`
    pub(crate) fn with_items(urls: &[&str]) -> Self {
        Self {
            default_items: Some(items(urls)),
            ..Self::failing()
        }
    }

    /// Every profile fails discovery
    pub(crate) fn failing() -> Self {
        Self {
            default_items: None,
            discoveries: Mutex::new(HashMap::new()),
            fetch_script: Mutex::new(HashMap::new()),
            gate: None,
            discover_calls: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(Vec::new()),
        }
    }

    /// Override discovery for one profile
    pub(crate) fn discovery_for(
        self,
        profile: &'static str,
        result: Result<Discovery, ExtractorError>,
    ) -> Self {
        self.discoveries.lock().unwrap().insert(profile, result);
        self
    }

    /// Queue fetch results for `url`
    pub(crate) fn fetch_results(self, url: &str, results: Vec<Result<(), ExtractorError>>) -> Self {
        self.fetch_script
            .lock()
            .unwrap()
            .insert(url.to_string(), results.into());
        self
    }

    /// Hold every fetch at a gate; returns the gate handle
    pub(crate) fn gated(mut self) -> (Self, Arc<FetchGate>) {
        let gate = Arc::new(FetchGate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub(crate) fn discover_calls(&self) -> Vec<&'static str> {
        self.discover_calls.lock().unwrap().clone()
    }

    pub(crate) fn fetch_calls(&self) -> Vec<FetchCall> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub(crate) fn fetched_urls(&self) -> Vec<String> {
        self.fetch_calls().into_iter().map(|c| c.url).collect()
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn discover(
        &self,
        _url: &str,
        profile: &ExtractorProfile,
        _proxy: Option<&str>,
    ) -> Result<Discovery, ExtractorError> {
        self.discover_calls.lock().unwrap().push(profile.name);

        if let Some(result) = self.discoveries.lock().unwrap().get(profile.name) {
            return result.clone();
        }
        match &self.default_items {
            Some(items) => Ok(Discovery::Collection(items.clone())),
            None => Err(ExtractorError::Failed(format!(
                "ERROR: Unsupported URL ({} profile)",
                profile.name
            ))),
        }
    }

    async fn fetch(&self, request: FetchRequest<'_>) -> Result<(), ExtractorError> {
        self.fetch_calls.lock().unwrap().push(FetchCall {
            url: request.item_url.to_string(),
            profile: request.profile.name,
            at: Instant::now(),
        });

        let filename = format!("{}.mp4", request.item_url);
        let downloading = || FetchProgress::Downloading {
            filename: filename.clone(),
        };

        if (request.progress)(downloading()).is_break() {
            return Err(ExtractorError::Aborted);
        }

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
            if (request.progress)(downloading()).is_break() {
                return Err(ExtractorError::Aborted);
            }
        }

        let result = self
            .fetch_script
            .lock()
            .unwrap()
            .get_mut(request.item_url)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(()));

        if result.is_ok() {
            let _ = (request.progress)(FetchProgress::Finished {
                filename: filename.clone(),
            });
        }
        result
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Item descriptors with `url` and `id` set
pub(crate) fn items(urls: &[&str]) -> Vec<ItemDescriptor> {
    urls.iter()
        .enumerate()
        .map(|(i, url)| ItemDescriptor {
            url: Some(url.to_string()),
            id: Some(format!("item{}", i + 1)),
            ..Default::default()
        })
        .collect()
}

/// A failure the runner classifies as rate limiting
pub(crate) fn rate_limited() -> ExtractorError {
    ExtractorError::Failed("ERROR: HTTP Error 429: Too Many Requests".into())
}

/// Manager over `extractor` whose default output root lives in a tempdir.
/// Returns the manager and the tempdir (which must be kept alive).
pub(crate) fn create_test_manager(extractor: Arc<dyn Extractor>) -> (JobManager, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.download.default_output_root = temp_dir.path().join("downloads");
    config.tools.search_path = false;

    let manager = JobManager::with_components(config, Arc::new(JobStore::new()), extractor);
    (manager, temp_dir)
}

/// Create a job for `url` under the manager's default output root
pub(crate) async fn create_job(manager: &JobManager, url: &str, max_videos: Option<usize>) -> Arc<Job> {
    manager
        .create(NewJob {
            profile_url: url.to_string(),
            output_root: Default::default(),
            max_videos,
            proxy: None,
        })
        .await
        .unwrap()
}
