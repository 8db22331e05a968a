//! JSON shapes exchanged between the HTTP server and its clients.

use serde::{Deserialize, Serialize};

use crate::job::{Job, JobStatus};
use crate::types::{JobId, Timestamp};

/// Body of `POST /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJobRequest {
    #[serde(default)]
    pub prompt: String,
}

/// `202 Accepted` body returned by `POST /jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Relative URL to poll for this job.
    pub status_url: String,
    pub created_at: Timestamp,
}

impl SubmitJobResponse {
    pub fn for_job(job: &Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            status_url: status_url(job.id),
            created_at: job.created_at,
        }
    }
}

/// Full job view returned by `GET /jobs/{id}`.
///
/// The prompt itself is not echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub status: JobStatus,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub error: Option<String>,
}

impl From<Job> for JobSnapshot {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            created_at: job.created_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
            exit_code: job.exit_code,
            stdout: job.stdout,
            stderr: job.stderr,
            error: job.error,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub version: String,
    pub time: Timestamp,
    pub queued: usize,
    pub running: usize,
}

/// Standard error body: `{"error": message, "code": CODE}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

/// Relative polling location for a job.
pub fn status_url(id: JobId) -> String {
    format!("/jobs/{id}")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn submit_request_defaults_missing_prompt() {
        let req: SubmitJobRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.prompt, "");
    }

    #[test]
    fn submit_response_points_at_job() {
        let job = Job::new("p".into(), Utc::now());
        let resp = SubmitJobResponse::for_job(&job);
        assert_eq!(resp.status_url, format!("/jobs/{}", job.id));
        assert_eq!(resp.status, JobStatus::Queued);
    }

    #[test]
    fn snapshot_omits_prompt_and_keeps_nulls() {
        let job = Job::new("secret prompt".into(), Utc::now());
        let json = serde_json::to_value(JobSnapshot::from(job)).unwrap();

        assert!(json.get("prompt").is_none());
        assert_eq!(json["status"], "queued");
        assert!(json["exit_code"].is_null());
        assert!(json["started_at"].is_null());
        assert!(json["error"].is_null());
    }
}
