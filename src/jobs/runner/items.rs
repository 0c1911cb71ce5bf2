//! Per-item processing with rate-limit backoff and cooldown.

use crate::error::ExtractorError;
use crate::extractor::{ExtractorProfile, FetchRequest, ItemDescriptor, OutputTemplate, Platform};
use crate::retry::{RetryError, RetryNotice, retry_with_backoff};
use crate::types::JobEvent;

use super::context::RunContext;

/// How the item loop ended
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ItemLoopEnd {
    /// Every item was processed (successfully or not)
    Exhausted,
    /// A checkpoint observed the cancel signal
    Cancelled,
}

/// Process items in order, updating counters and progress after each one.
///
/// Items without a fetchable URL count as failed without an attempt. Only
/// rate-limit failures are retried; any other failure counts as failed
/// immediately. Platforms with an item cooldown pause between attempted
/// items, never after the last one.
pub(super) async fn process_items(
    ctx: &RunContext,
    platform: Platform,
    profile: &ExtractorProfile,
    template: &OutputTemplate,
    items: &[ItemDescriptor],
) -> ItemLoopEnd {
    let id = ctx.id();
    let total = items.len();
    let cooldown = platform.item_cooldown(&ctx.config.download);
    let sink = ctx.progress_sink();

    for (offset, item) in items.iter().enumerate() {
        let index = offset + 1;

        // Checkpoint between items
        if ctx.job.is_cancelled() {
            tracing::info!(job_id = %id, index, total, "Cancellation observed before item");
            return ItemLoopEnd::Cancelled;
        }

        let Some(item_url) = item.fetch_url() else {
            tracing::warn!(job_id = %id, index, item_id = ?item.id, "Item has no downloadable URL");
            ctx.job.record_failed();
            ctx.emit(JobEvent::ItemFailed {
                id,
                index,
                error: "no downloadable URL".to_string(),
            });
            ctx.job.set_progress(index);
            continue;
        };

        tracing::debug!(job_id = %id, index, total, url = item_url, "Fetching item");

        let extractor = ctx.extractor.as_ref();
        let job = &ctx.job;
        let proxy = ctx.job.proxy();

        let result = retry_with_backoff(
            &ctx.config.retry,
            |notice: RetryNotice| {
                let delay_secs = notice.delay.as_secs();
                job.set_message(format!(
                    "Rate limit detected, retrying in {}s... ({}/{})",
                    delay_secs, notice.attempt, notice.max_attempts
                ));
                ctx.emit(JobEvent::Retrying {
                    id,
                    index,
                    attempt: notice.attempt,
                    delay_secs,
                });
            },
            || {
                let sink = sink.clone();
                async move {
                    // Checkpoint before every attempt, including retries after a backoff
                    if job.is_cancelled() {
                        return Err(ExtractorError::Aborted);
                    }
                    extractor
                        .fetch(FetchRequest {
                            item_url,
                            profile,
                            output: template,
                            proxy,
                            progress: sink,
                        })
                        .await
                }
            },
        )
        .await;

        match result {
            Ok(()) => {
                ctx.job.record_downloaded();
                ctx.emit(JobEvent::ItemDownloaded { id, index });
            }
            Err(RetryError::Permanent(ExtractorError::Aborted)) => {
                tracing::info!(job_id = %id, index, "Transfer aborted by cancellation");
                return ItemLoopEnd::Cancelled;
            }
            Err(RetryError::Permanent(e)) => {
                tracing::warn!(job_id = %id, index, url = item_url, error = %e, "Item download failed");
                ctx.job.record_failed();
                ctx.emit(JobEvent::ItemFailed {
                    id,
                    index,
                    error: e.to_string(),
                });
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                tracing::error!(
                    job_id = %id,
                    index,
                    url = item_url,
                    attempts,
                    error = %last,
                    "Item blocked by rate limit"
                );
                ctx.job.record_failed();
                ctx.job.set_message(format!(
                    "Item blocked by rate limit after {} attempts",
                    attempts
                ));
                ctx.emit(JobEvent::ItemFailed {
                    id,
                    index,
                    error: last.to_string(),
                });
            }
        }

        ctx.job.set_progress(index);

        if let Some(pause) = cooldown.filter(|_| index < total) {
            tracing::debug!(job_id = %id, cooldown_ms = pause.as_millis() as u64, "Item cooldown");
            tokio::time::sleep(pause).await;
        }
    }

    ItemLoopEnd::Exhausted
}
