//! Waiting helpers and custom assertions

use profile_dl::{JobEvent, JobId, JobManager, JobSnapshot, JobStatus};
use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;

/// Result of waiting for a job to finish
#[derive(Debug, PartialEq)]
pub enum WaitResult {
    /// Job completed
    Completed,
    /// Job failed with this message
    Failed(String),
    /// Job was cancelled
    Cancelled,
    /// Timeout waiting for a terminal event
    Timeout,
    /// Channel closed unexpectedly
    ChannelClosed,
}

/// Wait for the terminal event of `id` on a receiver subscribed before the
/// job was started
pub async fn wait_for_terminal(
    events: &mut broadcast::Receiver<JobEvent>,
    id: JobId,
    timeout: Duration,
) -> WaitResult {
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(event) if event.job_id() != id => continue,
                Ok(JobEvent::Completed { .. }) => return WaitResult::Completed,
                Ok(JobEvent::Failed { error, .. }) => return WaitResult::Failed(error),
                Ok(JobEvent::Cancelled { .. }) => return WaitResult::Cancelled,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    result.unwrap_or(WaitResult::Timeout)
}

/// Poll the manager until the job reaches a terminal status
pub async fn poll_until_terminal(manager: &JobManager, id: JobId, timeout: Duration) -> JobSnapshot {
    tokio::time::timeout(timeout, async {
        loop {
            let snapshot = manager.snapshot(id).unwrap();
            if snapshot.status.is_terminal() {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("job {id} did not finish within {timeout:?}"))
}

/// Assert the counters of a finished job
pub fn assert_job_outcome(
    snapshot: &JobSnapshot,
    status: JobStatus,
    total: usize,
    downloaded: usize,
    failed: usize,
) {
    assert_eq!(snapshot.status, status, "message: {}", snapshot.message);
    assert_eq!(snapshot.total, Some(total), "total");
    assert_eq!(snapshot.downloaded, downloaded, "downloaded");
    assert_eq!(snapshot.failed, failed, "failed");
}

/// Assert a file exists and is not empty
pub fn assert_file_written(path: &Path) {
    let metadata = std::fs::metadata(path)
        .unwrap_or_else(|e| panic!("expected {} to exist: {e}", path.display()));
    assert!(metadata.len() > 0, "{} is empty", path.display());
}
