//! Test configuration helpers

use profile_dl::{Config, Extractor, JobManager, JobStore};
use std::sync::Arc;
use tempfile::TempDir;

/// Configuration rooted in a fresh temp directory, with PATH lookup disabled
pub fn test_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.default_output_root = temp_dir.path().join("downloads");
    config.tools.search_path = false;
    config
}

/// Manager over `extractor`; keep the returned TempDir alive for the test
pub fn create_test_manager(extractor: Arc<dyn Extractor>) -> (JobManager, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = test_config(&temp_dir);
    let manager = JobManager::with_components(config, Arc::new(JobStore::new()), extractor);
    (manager, temp_dir)
}

/// Install a test subscriber once; respects RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("profile_dl=debug")),
        )
        .with_test_writer()
        .try_init();
}
