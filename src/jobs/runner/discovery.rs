//! Discovery with an ordered profile fallback chain.

use crate::error::{Error, ExtractorError, Result};
use crate::extractor::{Discovery, ExtractorProfile};
use crate::types::JobEvent;

use super::context::RunContext;

/// Try the primary profile, then each fallback in order.
///
/// Returns the first profile that succeeded together with its discovery, or
/// `None` when every profile failed. A missing or unrunnable extractor is
/// reported as an error straight away since no profile can help.
pub(super) async fn discover_with_fallbacks<'p>(
    ctx: &RunContext,
    chain: &'p [ExtractorProfile],
) -> Result<Option<(&'p ExtractorProfile, Discovery)>> {
    let id = ctx.id();
    let url = ctx.job.profile_url();
    let proxy = ctx.job.proxy();

    let Some((primary, fallbacks)) = chain.split_first() else {
        return Ok(None);
    };

    ctx.job.set_message("Extracting information...");
    match ctx.extractor.discover(url, primary, proxy).await {
        Ok(discovery) => return Ok(Some((primary, discovery))),
        Err(e) if is_unavailable(&e) => return Err(Error::Extractor(e)),
        Err(e) => {
            tracing::warn!(
                job_id = %id,
                profile = primary.name,
                error = %e,
                "Discovery failed, trying fallback profiles"
            );
        }
    }

    let of = fallbacks.len();
    for (i, profile) in fallbacks.iter().enumerate() {
        if ctx.job.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let attempt = i + 1;
        ctx.job
            .set_message(format!("Retrying with alternative method {}/{}...", attempt, of));
        ctx.emit(JobEvent::FallbackProfile {
            id,
            profile: profile.name.to_string(),
            attempt,
            of,
        });
        tracing::info!(job_id = %id, profile = profile.name, attempt, of, "Trying fallback profile");

        match ctx.extractor.discover(url, profile, proxy).await {
            Ok(discovery) => {
                tracing::info!(job_id = %id, profile = profile.name, "Fallback profile succeeded");
                return Ok(Some((profile, discovery)));
            }
            Err(e) if is_unavailable(&e) => return Err(Error::Extractor(e)),
            Err(e) => {
                tracing::warn!(
                    job_id = %id,
                    profile = profile.name,
                    error = %e,
                    "Fallback profile failed"
                );
            }
        }
    }

    Ok(None)
}

fn is_unavailable(error: &ExtractorError) -> bool {
    matches!(
        error,
        ExtractorError::NotSupported(_) | ExtractorError::Spawn(_)
    )
}
