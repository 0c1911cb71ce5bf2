//! Job finalization: write the terminal status exactly once.

use crate::error::{Error, Result};
use crate::types::{JobEvent, JobStatus};

use super::context::RunContext;
use super::orchestration::RunOutcome;

/// Map the run outcome to a terminal status.
///
/// A job that was cancelled while the runner worked keeps its Cancelled
/// status: the guarded transition rejects any later Completed or Failed.
pub(super) fn finalize_job(ctx: &RunContext, outcome: Result<RunOutcome>) {
    let id = ctx.id();

    match outcome {
        Ok(RunOutcome::Finished) => {
            let (downloaded, failed) = ctx.job.counts();
            let message = format!("Done. Downloaded={}, Failed={}", downloaded, failed);
            if ctx.job.finish(JobStatus::Completed, message) {
                tracing::info!(job_id = %id, downloaded, failed, "Job completed");
                ctx.emit(JobEvent::Completed {
                    id,
                    downloaded,
                    failed,
                });
            } else {
                log_already_final(ctx);
            }
        }
        Ok(RunOutcome::Cancelled) | Err(Error::Cancelled) => {
            let (downloaded, failed) = ctx.job.counts();
            tracing::info!(job_id = %id, downloaded, failed, "Job stopped after cancellation");
        }
        Ok(RunOutcome::DiscoveryExhausted(platform)) => {
            tracing::error!(job_id = %id, %platform, "Every discovery profile failed");
            fail(ctx, platform.discovery_diagnostic().to_string());
        }
        Err(e) => {
            if ctx.job.is_cancelled() {
                tracing::info!(job_id = %id, error = %e, "Job errored after cancellation");
            } else {
                tracing::error!(job_id = %id, error = %e, "Job failed");
                fail(ctx, e.to_string());
            }
        }
    }
}

fn fail(ctx: &RunContext, message: String) {
    let id = ctx.id();
    if ctx.job.finish(JobStatus::Failed, message.clone()) {
        ctx.emit(JobEvent::Failed { id, error: message });
    } else {
        log_already_final(ctx);
    }
}

fn log_already_final(ctx: &RunContext) {
    tracing::debug!(
        job_id = %ctx.id(),
        status = %ctx.job.status(),
        "Job reached a terminal status before the runner finished"
    );
}
