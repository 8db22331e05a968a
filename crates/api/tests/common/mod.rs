#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use bridge_api::auth::SharedSecretVerifier;
use bridge_api::config::ServerConfig;
use bridge_api::router::build_app_router;
use bridge_api::state::AppState;
use bridge_core::execution::ExecutorConfig;
use bridge_core::job::Job;
use bridge_core::store::JobStore;
use bridge_core::types::JobId;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const TEST_TOKEN: &str = "test-token";

/// Small limits so boundary tests stay cheap.
pub const TEST_MAX_PROMPT_CHARS: usize = 64;
pub const TEST_MAX_OUTPUT_CHARS: usize = 256;

/// Build a test `ServerConfig` with safe defaults.
///
/// The executor config is never used by the router itself; worker tests
/// build their own executor.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        token: TEST_TOKEN.to_string(),
        max_prompt_chars: TEST_MAX_PROMPT_CHARS,
        max_output_chars: TEST_MAX_OUTPUT_CHARS,
        workers: 1,
        executor: ExecutorConfig {
            command: "echo".to_string(),
            prompt_mode: "arg".to_string(),
            timeout: Duration::from_secs(5),
            working_dir: PathBuf::from("."),
        },
    }
}

/// Build an `AppState` around a fresh, empty store.
pub fn test_state() -> AppState {
    test_state_with(test_config())
}

/// Like [`test_state`] but with a caller-adjusted config.
pub fn test_state_with(config: ServerConfig) -> AppState {
    AppState {
        store: Arc::new(JobStore::new(config.max_output_chars)),
        verifier: Arc::new(SharedSecretVerifier::new(&config.token)),
        config: Arc::new(config),
    }
}

/// Build the full application router, mirroring `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    build_app_router(state, &config)
}

/// Send a request with an optional bearer token and JSON body.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// GET without credentials.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

/// GET with the test token.
pub async fn get_authed(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(TEST_TOKEN), None).await
}

/// POST a JSON body with the test token.
pub async fn post_authed(app: Router, uri: &str, body: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(TEST_TOKEN), Some(body)).await
}

/// Submit a prompt through the HTTP API and return the new job id.
pub async fn submit(app: Router, prompt: &str) -> JobId {
    let body = serde_json::json!({ "prompt": prompt }).to_string();
    let response = post_authed(app, "/jobs", &body).await;
    assert_eq!(response.status(), axum::http::StatusCode::ACCEPTED);
    let json = body_json(response).await;
    json["job_id"].as_str().unwrap().parse().unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll the store until the job reaches a terminal status.
pub async fn wait_for_terminal(store: &JobStore, id: JobId) -> Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let job = store.get(id).await.expect("job exists");
        if job.status.is_terminal() {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {id} still {} after 10s",
            job.status
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
