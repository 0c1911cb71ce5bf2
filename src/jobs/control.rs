//! Creating, querying, cancelling and scheduling jobs.

use crate::error::{Error, JobError, Result};
use crate::types::{JobEvent, JobId, JobSnapshot, NewJob};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::runner::{RunContext, run_job};
use super::{Job, JobManager};

impl JobManager {
    /// Register a new Queued job
    ///
    /// The URL and proxy are trimmed (a blank proxy means none), a
    /// `max_videos` of 0 means unlimited and an empty `output_root` falls back
    /// to `download.default_output_root`. The output root is created if
    /// missing. The job does not start until [`run`](Self::run) or
    /// [`spawn`](Self::spawn) is called.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the URL is blank
    /// - [`Error::Io`] if the output root cannot be created
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use profile_dl::*;
    /// # async fn example(manager: JobManager) -> Result<()> {
    /// let job = manager
    ///     .create(NewJob {
    ///         profile_url: "https://www.tiktok.com/@someone".into(),
    ///         output_root: "downloads".into(),
    ///         max_videos: Some(5),
    ///         proxy: None,
    ///     })
    ///     .await?;
    /// manager.spawn(job.id());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(&self, request: NewJob) -> Result<Arc<Job>> {
        let profile_url = request.profile_url.trim().to_string();
        if profile_url.is_empty() {
            return Err(Error::Validation("profile_url must not be empty".into()));
        }

        let proxy = request
            .proxy
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let max_videos = request.max_videos.filter(|&n| n > 0);
        let output_root = if request.output_root.as_os_str().is_empty() {
            self.config.download.default_output_root.clone()
        } else {
            request.output_root
        };

        tokio::fs::create_dir_all(&output_root).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create output directory '{}': {}",
                    output_root.display(),
                    e
                ),
            ))
        })?;

        let job = Arc::new(Job::new(
            JobId::new(),
            NewJob {
                profile_url,
                output_root,
                max_videos,
                proxy,
            },
        ));
        self.store.put(job.clone())?;

        tracing::info!(
            job_id = %job.id(),
            url = job.profile_url(),
            max_videos = ?job.max_videos(),
            output_root = %job.output_root().display(),
            "Job created"
        );
        self.emit(JobEvent::Created {
            id: job.id(),
            url: job.profile_url().to_string(),
        });

        Ok(job)
    }

    /// Live handle for a job
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] if no job has this id.
    pub fn get(&self, id: JobId) -> Result<Arc<Job>> {
        self.store
            .get(id)
            .ok_or_else(|| Error::Job(JobError::NotFound { id }))
    }

    /// Point-in-time copy of a job
    pub fn snapshot(&self, id: JobId) -> Result<JobSnapshot> {
        Ok(self.get(id)?.snapshot())
    }

    /// Snapshots of every job, oldest first
    pub fn list(&self) -> Vec<JobSnapshot> {
        self.store.list().iter().map(|job| job.snapshot()).collect()
    }

    /// Cancel a job
    ///
    /// Fires the job's cancel signal; a Queued or Running job becomes
    /// Cancelled immediately, and a running transfer stops at its next
    /// checkpoint. Cancelling a job that already finished is a successful
    /// no-op that leaves its status untouched.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::NotFound`] if no job has this id.
    pub fn cancel(&self, id: JobId) -> Result<()> {
        let job = self.get(id)?;

        if job.cancel() {
            tracing::info!(job_id = %id, "Job cancelled");
            self.emit(JobEvent::Cancelled { id });
        } else {
            tracing::debug!(
                job_id = %id,
                status = %job.status(),
                "Cancel requested for finished job, nothing to do"
            );
        }

        Ok(())
    }

    /// Drive a job to a terminal status
    ///
    /// Completes when the job is Completed, Cancelled or Failed. Does nothing
    /// if the job does not exist or is no longer Queued, so calling it twice
    /// never runs a job twice.
    pub async fn run(&self, id: JobId) {
        let Some(job) = self.store.get(id) else {
            tracing::warn!(job_id = %id, "Run requested for unknown job");
            return;
        };

        run_job(RunContext {
            job,
            extractor: self.extractor.clone(),
            config: self.config.clone(),
            event_tx: self.event_tx.clone(),
        })
        .await;
    }

    /// Schedule [`run`](Self::run) on the tokio runtime
    pub fn spawn(&self, id: JobId) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move { manager.run(id).await })
    }

    /// Cancel every job that has not finished yet
    ///
    /// Returns how many jobs were cancelled. Runners stop at their next
    /// checkpoint; this does not wait for them.
    pub fn shutdown(&self) -> usize {
        let mut cancelled = 0;
        for job in self.store.list() {
            if job.cancel() {
                self.emit(JobEvent::Cancelled { id: job.id() });
                cancelled += 1;
            }
        }
        tracing::info!(cancelled, total = self.store.len(), "Job manager shut down");
        cancelled
    }
}
