//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the profile-dl REST API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the profile-dl REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "profile-dl REST API",
        version = "0.1.0",
        description = "REST API for creating, monitoring and cancelling profile and video download jobs",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::list_jobs,
        crate::api::routes::get_job,
        crate::api::routes::create_job,
        crate::api::routes::cancel_job,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::JobSnapshot,
        crate::types::JobEvent,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::RetryConfig,
        crate::config::ToolsConfig,
        crate::config::ServerIntegrationConfig,
        crate::config::ApiConfig,

        // API request/response types
        crate::api::routes::CreateJobRequest,
        crate::api::routes::CreateJobResponse,
        crate::api::routes::CancelJobResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "jobs", description = "Download jobs - Create, inspect and cancel profile downloads"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
