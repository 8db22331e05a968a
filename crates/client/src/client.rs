//! Typed wrapper over the bridge's REST endpoints using [`reqwest`].

use std::time::Duration;

use bridge_core::types::JobId;
use bridge_core::wire::{HealthResponse, JobSnapshot, SubmitJobRequest, SubmitJobResponse};
use tokio::time::Instant;

use crate::error::ClientError;
use crate::wait::{WaitOutcome, WaitPolicy};

/// HTTP client for a single bridge server.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl BridgeClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8787`).
    ///
    /// `timeout` bounds each individual HTTP request, not a whole wait.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bridge-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, token))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /jobs`.
    pub async fn create_job(&self, prompt: &str) -> Result<SubmitJobResponse, ClientError> {
        let body = SubmitJobRequest {
            prompt: prompt.to_string(),
        };
        let response = self
            .client
            .post(self.url("/jobs"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /jobs/{id}`.
    pub async fn get_job(&self, id: JobId) -> Result<JobSnapshot, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/jobs/{id}")))
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /health`. Sent without a credential.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;

        Self::parse_response(response).await
    }

    /// Poll `GET /jobs/{id}` until the job is terminal or `max_wait` passes.
    ///
    /// Always fetches at least once. Request errors end the wait early.
    pub async fn wait_for_job(
        &self,
        id: JobId,
        policy: WaitPolicy,
    ) -> Result<WaitOutcome, ClientError> {
        let deadline = Instant::now() + policy.max_wait;
        loop {
            let snapshot = self.get_job(id).await?;
            if snapshot.status.is_terminal() {
                return Ok(WaitOutcome::Finished(snapshot));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(WaitOutcome::TimedOut(snapshot));
            }
            tracing::debug!(job_id = %id, status = %snapshot.status, "Job not finished yet");
            tokio::time::sleep(policy.poll_interval.min(remaining)).await;
        }
    }

    /// Submit a prompt and wait for its outcome.
    pub async fn run_job(
        &self,
        prompt: &str,
        policy: WaitPolicy,
    ) -> Result<WaitOutcome, ClientError> {
        let created = self.create_job(prompt).await?;
        self.wait_for_job(created.job_id, policy).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`ClientError::Status`] with its body.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
