//! Job execution -- the state machine that drives one job to a terminal status.
//!
//! Split into focused submodules:
//! - [`context`] - Shared handles and the progress checkpoint
//! - [`orchestration`] - Top-level lifecycle of a single job
//! - [`discovery`] - Primary profile with ordered fallbacks
//! - [`items`] - Per-item transfer with rate-limit backoff and cooldown
//! - [`finalization`] - Terminal status and completion message

mod context;
mod discovery;
mod finalization;
mod items;
mod orchestration;

pub(crate) use context::RunContext;
pub(crate) use orchestration::run_job;
