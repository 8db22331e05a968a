//! Client tests against a real bridge server bound to an ephemeral port.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use bridge_api::auth::SharedSecretVerifier;
use bridge_api::config::ServerConfig;
use bridge_api::engine::spawn_workers;
use bridge_api::router::build_app_router;
use bridge_api::state::AppState;
use bridge_client::{BridgeClient, ClientError, WaitOutcome, WaitPolicy};
use bridge_core::execution::{ExecutionError, ExecutionOutput, ExecutorConfig, PromptExecutor};
use bridge_core::job::JobStatus;
use bridge_core::types::JobId;
use tokio_util::sync::CancellationToken;

const TOKEN: &str = "client-test-token";

/// Executor whose prompts encode the outcome: `sleep <ms>` waits then
/// succeeds, `fail` exits 1, anything else is echoed back.
struct ScriptedExecutor;

impl PromptExecutor for ScriptedExecutor {
    async fn run(&self, prompt: &str) -> Result<ExecutionOutput, ExecutionError> {
        if let Some(ms) = prompt.strip_prefix("sleep ") {
            let ms: u64 = ms.parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            return Ok(ExecutionOutput::new(0, "slept", ""));
        }
        if prompt == "fail" {
            return Ok(ExecutionOutput::new(1, "", "nope"));
        }
        Ok(ExecutionOutput::new(0, prompt, ""))
    }
}

struct TestServer {
    base_url: String,
    cancel: CancellationToken,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn start_server() -> TestServer {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        token: TOKEN.to_string(),
        max_prompt_chars: 100,
        max_output_chars: 1000,
        workers: 1,
        executor: ExecutorConfig {
            command: "unused".to_string(),
            prompt_mode: "arg".to_string(),
            timeout: Duration::from_secs(5),
            working_dir: PathBuf::from("."),
        },
    };
    let store = Arc::new(bridge_core::store::JobStore::new(config.max_output_chars));
    let cancel = CancellationToken::new();
    spawn_workers(1, Arc::clone(&store), Arc::new(ScriptedExecutor), cancel.clone());

    let state = AppState {
        store,
        verifier: Arc::new(SharedSecretVerifier::new(&config.token)),
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        cancel,
    }
}

fn client(server: &TestServer, token: &str) -> BridgeClient {
    BridgeClient::new(&server.base_url, token, Duration::from_secs(5)).unwrap()
}

fn fast_policy(max_wait: Duration) -> WaitPolicy {
    // Bypasses the 1s floor in `WaitPolicy::new` to keep tests quick.
    WaitPolicy {
        poll_interval: Duration::from_millis(20),
        max_wait,
    }
}

// ---- Test: health ----

#[tokio::test]
async fn health_works_without_token() {
    let server = start_server().await;

    let health = client(&server, "").health().await.unwrap();

    assert!(health.ok);
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// ---- Test: submit and wait ----

#[tokio::test]
async fn submit_then_wait_until_finished() {
    let server = start_server().await;
    let client = client(&server, TOKEN);

    let created = client.create_job("hello there").await.unwrap();
    assert_eq!(created.status, JobStatus::Queued);
    assert_eq!(created.status_url, format!("/jobs/{}", created.job_id));

    let outcome = client
        .wait_for_job(created.job_id, fast_policy(Duration::from_secs(5)))
        .await
        .unwrap();

    let job = assert_matches!(outcome, WaitOutcome::Finished(job) => job);
    assert_eq!(job.id, created.job_id);
    assert_eq!(job.status, JobStatus::Succeeded);
    assert_eq!(job.exit_code, Some(0));
    assert_eq!(job.stdout.as_deref(), Some("hello there"));
}

#[tokio::test]
async fn failed_job_is_still_finished() {
    let server = start_server().await;

    let outcome = client(&server, TOKEN)
        .run_job("fail", fast_policy(Duration::from_secs(5)))
        .await
        .unwrap();

    assert!(outcome.is_finished());
    assert_eq!(outcome.snapshot().status, JobStatus::Failed);
    assert_eq!(outcome.snapshot().exit_code, Some(1));
}

#[tokio::test]
async fn wait_gives_up_with_last_snapshot() {
    let server = start_server().await;
    let client = client(&server, TOKEN);

    let created = client.create_job("sleep 2000").await.unwrap();
    let outcome = client
        .wait_for_job(created.job_id, fast_policy(Duration::from_millis(100)))
        .await
        .unwrap();

    let job = assert_matches!(outcome, WaitOutcome::TimedOut(job) => job);
    assert!(!job.status.is_terminal());
}

// ---- Test: error surfaces ----

#[tokio::test]
async fn wrong_token_is_status_401() {
    let server = start_server().await;

    let err = client(&server, "wrong").create_job("hi").await.unwrap_err();

    assert_matches!(err, ClientError::Status { status: 401, ref body } if body.contains("UNAUTHORIZED"));
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn empty_prompt_is_status_400() {
    let server = start_server().await;

    let err = client(&server, TOKEN).create_job("   ").await.unwrap_err();

    assert_matches!(err, ClientError::Status { status: 400, ref body } if body.contains("prompt is required"));
}

#[tokio::test]
async fn unknown_job_is_status_404() {
    let server = start_server().await;

    let err = client(&server, TOKEN)
        .get_job(JobId::new_v4())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn unreachable_server_is_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BridgeClient::new(format!("http://{addr}"), TOKEN, Duration::from_secs(2)).unwrap();
    let err = client.health().await.unwrap_err();

    assert_matches!(err, ClientError::Http(_));
    assert_eq!(err.status(), None);
}
