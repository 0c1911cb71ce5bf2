use super::*;
use crate::jobs::test_helpers::{ScriptedExtractor, create_job, create_test_manager};
use crate::types::{JobId, JobSnapshot, JobStatus};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;


/// Router over a scripted extractor whose profiles discover `urls`
fn create_test_app(urls: &[&str]) -> (Router, JobManager, tempfile::TempDir) {
    let (manager, temp_dir) = create_test_manager(Arc::new(ScriptedExtractor::with_items(urls)));
    let config = Arc::new(manager.config().clone());
    (create_router(manager.clone(), config), manager, temp_dir)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn wait_for_terminal(manager: &JobManager, id: JobId) -> JobSnapshot {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = manager.snapshot(id).unwrap();
            if snapshot.status.is_terminal() {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("job should reach a terminal status")
}

#[tokio::test]
async fn test_api_server_spawns() {
    let (manager, _temp_dir) = create_test_manager(Arc::new(ScriptedExtractor::failing()));

    let mut config = manager.config().clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn(async move { start_api_server(manager, config).await });

    // Give it a moment to start
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be serving");
    api_handle.abort();
}

#[tokio::test]
async fn test_start_api_server_reports_bind_failure() {
    let (manager, _temp_dir) = create_test_manager(Arc::new(ScriptedExtractor::failing()));
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();

    let mut config = manager.config().clone();
    config.server.api.bind_address = occupied.local_addr().unwrap();

    let result = start_api_server(manager, Arc::new(config)).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _manager, _temp_dir) = create_test_app(&[]);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (manager, _temp_dir) = create_test_manager(Arc::new(ScriptedExtractor::failing()));
    let mut config = manager.config().clone();
    config.server.api.cors_enabled = false;
    let app = create_router(manager, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (manager, _temp_dir) = create_test_manager(Arc::new(ScriptedExtractor::failing()));
    let mut config = manager.config().clone();
    config.server.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = create_router(manager, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://allowed.example"
    );
}
