//! The job record and its lifecycle state machine.
//!
//! ```text
//! queued ──> running ──> succeeded
//!                   └──> failed
//! ```
//!
//! Terminal states are final. The [`store::JobStore`](crate::store::JobStore)
//! is the only place that applies a [`JobUpdate`] to a [`Job`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::execution::ExecutionOutput;
use crate::types::{JobId, Timestamp};

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// Position in the lifecycle; terminal states share the last rank.
    fn rank(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Running => 1,
            Self::Succeeded | Self::Failed => 2,
        }
    }

    /// Whether the job has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether `self -> next` is a legal single-step transition.
    ///
    /// Only `queued -> running` and `running -> {succeeded, failed}` are legal.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() == self.rank() + 1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of submitted work.
///
/// `id`, `prompt` and `created_at` never change after creation. The
/// remaining fields are filled in as the job moves through its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: JobId,
    pub prompt: String,
    pub status: JobStatus,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    /// Present once the command ran to completion (zero or non-zero).
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    /// Present only when the command could not be run to completion.
    pub error: Option<String>,
}

impl Job {
    /// Build a freshly queued job.
    pub fn new(prompt: String, created_at: Timestamp) -> Self {
        Self {
            id: JobId::new_v4(),
            prompt,
            status: JobStatus::Queued,
            created_at,
            started_at: None,
            finished_at: None,
            exit_code: None,
            stdout: None,
            stderr: None,
            error: None,
        }
    }
}

/// A set of fields to merge into a stored [`Job`] in one atomic step.
///
/// Fields left as `None` are not touched. Use the constructors rather than
/// filling fields by hand: they pair each status with the fields that must
/// accompany it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
    pub exit_code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub error: Option<String>,
}

impl JobUpdate {
    /// `queued -> running`.
    pub fn started(at: Timestamp) -> Self {
        Self {
            status: Some(JobStatus::Running),
            started_at: Some(at),
            ..Self::default()
        }
    }

    /// `running -> succeeded | failed`, decided by the exit code.
    pub fn completed(output: ExecutionOutput, at: Timestamp) -> Self {
        let status = if output.exit_code == 0 {
            JobStatus::Succeeded
        } else {
            JobStatus::Failed
        };
        Self {
            status: Some(status),
            finished_at: Some(at),
            exit_code: Some(output.exit_code),
            stdout: Some(output.stdout),
            stderr: Some(output.stderr),
            ..Self::default()
        }
    }

    /// `running -> failed` because the command could not be run at all.
    pub fn errored(message: impl Into<String>, at: Timestamp) -> Self {
        Self {
            status: Some(JobStatus::Failed),
            finished_at: Some(at),
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
