//! Shared state for a running job.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::extractor::{Extractor, FetchProgress, ProgressSink};
use crate::jobs::Job;
use crate::types::{JobEvent, JobId};

/// Everything a runner needs, cloned out of the [`JobManager`](crate::JobManager)
pub(crate) struct RunContext {
    pub(crate) job: Arc<Job>,
    pub(crate) extractor: Arc<dyn Extractor>,
    pub(crate) config: Arc<Config>,
    pub(crate) event_tx: broadcast::Sender<JobEvent>,
}

impl RunContext {
    pub(crate) fn id(&self) -> JobId {
        self.job.id()
    }

    pub(crate) fn emit(&self, event: JobEvent) {
        self.event_tx.send(event).ok();
    }

    /// Progress checkpoint handed to the extractor.
    ///
    /// Breaks as soon as the job is cancelled; otherwise mirrors the current
    /// file into the job message.
    pub(crate) fn progress_sink(&self) -> ProgressSink {
        let job = self.job.clone();
        Arc::new(move |progress| {
            if job.is_cancelled() {
                return ControlFlow::Break(());
            }
            match progress {
                FetchProgress::Downloading { filename } => job.set_message(filename),
                FetchProgress::Finished { filename } => {
                    job.set_message(format!("Downloaded {}", filename))
                }
            }
            ControlFlow::Continue(())
        })
    }
}
