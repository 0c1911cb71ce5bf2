//! REST API server example
//!
//! Runs profile-dl with the REST API enabled so jobs can be driven over HTTP.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:8000/swagger-ui
//! - Create jobs via POST http://localhost:8000/jobs
//! - Monitor progress via GET http://localhost:8000/jobs
//! - Stream events via GET http://localhost:8000/events
//!
//! Environment overrides (`PROFILE_DL_OUTPUT_ROOT`, `PROFILE_DL_BIND_ADDRESS`,
//! `YTDLP_PATH`, `YTDLP_CONCURRENCY`) are applied on top of the defaults.
//! Set `RUST_LOG=profile_dl=debug` for detailed logs.

use profile_dl::{Config, JobManager, run_with_shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,profile_dl=info")),
        )
        .init();

    let mut config = Config::default();
    config.apply_env_overrides()?;

    let address = config.server.api.bind_address;
    let manager = JobManager::new(config);

    println!("Starting profile-dl REST API server");
    println!("Swagger UI: http://{address}/swagger-ui");
    println!("Events stream: http://{address}/events");
    println!("Extractor: {}", manager.extractor_name());
    println!();
    println!("Example commands:");
    println!("  # Download the five newest videos of a profile");
    println!("  curl -X POST http://{address}/jobs \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"profile_url\": \"https://www.tiktok.com/@someone\", \"max_videos\": 5}}'");
    println!();
    println!("  # List all jobs");
    println!("  curl http://{address}/jobs");
    println!();
    println!("  # Stream events (Server-Sent Events)");
    println!("  curl -N http://{address}/events");

    let server = manager.spawn_api_server();

    tokio::select! {
        result = server => {
            // The server only returns on failure
            result??;
        }
        result = run_with_shutdown(manager) => {
            result?;
        }
    }

    Ok(())
}
