//! Top-level lifecycle for a single job run.

use crate::error::{Error, Result};
use crate::extractor::{OutputTemplate, Platform};
use crate::types::JobEvent;

use super::context::RunContext;
use super::discovery::discover_with_fallbacks;
use super::finalization::finalize_job;
use super::items::{ItemLoopEnd, process_items};

/// How the body of a run ended, before the terminal status is written
#[derive(Debug)]
pub(super) enum RunOutcome {
    /// Every item was processed
    Finished,
    /// The cancel signal was observed at a checkpoint
    Cancelled,
    /// No profile in the chain could discover the URL
    DiscoveryExhausted(Platform),
}

/// Drive one job from Queued to a terminal status.
///
/// Phases:
/// 1. Claim the job (Queued → Running); anything else is a no-op
/// 2. Prepare the output directory and template
/// 3. Discover items with the platform's profile chain
/// 4. Truncate to `max_videos` and process items in order
/// 5. Write the terminal status
pub(crate) async fn run_job(ctx: RunContext) {
    let id = ctx.id();

    // Phase 1: exactly one runner wins the Queued → Running transition
    if !ctx.job.try_start() {
        tracing::debug!(
            job_id = %id,
            status = %ctx.job.status(),
            "Job is not queued, skipping run"
        );
        return;
    }

    tracing::info!(job_id = %id, url = ctx.job.profile_url(), "Job started");
    ctx.emit(JobEvent::Started { id });

    let outcome = execute(&ctx).await;

    finalize_job(&ctx, outcome);
}

async fn execute(ctx: &RunContext) -> Result<RunOutcome> {
    let id = ctx.id();

    // Phase 2: output location
    let output_root = ctx.job.output_root();
    tokio::fs::create_dir_all(output_root).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to create output directory '{}': {}",
                output_root.display(),
                e
            ),
        ))
    })?;
    let template = OutputTemplate::new(output_root);

    // Phase 3: discovery
    let platform = Platform::classify(ctx.job.profile_url());
    let chain = platform.profile_chain(&ctx.config.download);
    tracing::debug!(job_id = %id, %platform, profiles = chain.len(), "Platform classified");

    let Some((profile, discovery)) = discover_with_fallbacks(ctx, &chain).await? else {
        return Ok(RunOutcome::DiscoveryExhausted(platform));
    };

    // Phase 4: items
    let mut items = discovery.into_items();
    if let Some(max) = ctx.job.max_videos() {
        items.truncate(max);
    }

    ctx.job.begin_items(items.len());
    ctx.emit(JobEvent::Discovered {
        id,
        total: items.len(),
    });
    tracing::info!(
        job_id = %id,
        total = items.len(),
        profile = profile.name,
        "Discovery complete"
    );

    match process_items(ctx, platform, profile, &template, &items).await {
        ItemLoopEnd::Exhausted => Ok(RunOutcome::Finished),
        ItemLoopEnd::Cancelled => Ok(RunOutcome::Cancelled),
    }
}
