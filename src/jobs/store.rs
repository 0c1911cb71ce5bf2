//! In-memory job registry.

use super::job::Job;
use crate::error::JobError;
use crate::types::JobId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Concurrency-safe map from [`JobId`] to live job handles
///
/// Jobs live for the lifetime of the store. The lock is only held for the
/// duration of a lookup or insert, never across job work.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Mutex<HashMap<JobId, Arc<Job>>>,
}

impl JobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, Arc<Job>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a job under its id
    ///
    /// # Errors
    ///
    /// Returns [`JobError::AlreadyExists`] if the id is taken; the stored job
    /// is left untouched.
    pub fn put(&self, job: Arc<Job>) -> Result<(), JobError> {
        let mut jobs = self.lock();
        let id = job.id();
        if jobs.contains_key(&id) {
            return Err(JobError::AlreadyExists { id });
        }
        jobs.insert(id, job);
        Ok(())
    }

    /// Live handle for `id`
    pub fn get(&self, id: JobId) -> Option<Arc<Job>> {
        self.lock().get(&id).cloned()
    }

    /// All jobs, oldest first
    pub fn list(&self) -> Vec<Arc<Job>> {
        let mut jobs: Vec<_> = self.lock().values().cloned().collect();
        jobs.sort_by_key(|job| (job.created_at(), job.id()));
        jobs
    }

    /// Number of stored jobs
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
