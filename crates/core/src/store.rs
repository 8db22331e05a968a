//! In-memory job registry plus the pending-work queue.
//!
//! [`JobStore`] is the single source of truth for job state. The registry is
//! guarded by one lock; every mutation goes through [`JobStore::update`] so a
//! reader never sees a half-applied transition. The FIFO queue is a separate
//! channel, so workers waiting for work never hold the registry lock.
//!
//! Records live for the lifetime of the store; nothing is evicted.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::error::CoreError;
use crate::job::{Job, JobStatus, JobUpdate};
use crate::output::truncate_output;
use crate::types::JobId;

/// Snapshot of queue depth and in-flight work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobMetrics {
    pub queued: usize,
    pub running: usize,
}

/// Thread-safe job registry and FIFO work queue.
///
/// Designed to be constructed once at startup, wrapped in `Arc`, and shared
/// between request handlers and worker loops.
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
    queue_tx: mpsc::UnboundedSender<JobId>,
    queue_rx: Mutex<mpsc::UnboundedReceiver<JobId>>,
    max_output_chars: usize,
}

impl JobStore {
    /// Create an empty store. Captured stdout/stderr longer than
    /// `max_output_chars` is truncated when written.
    pub fn new(max_output_chars: usize) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        Self {
            jobs: RwLock::new(HashMap::new()),
            queue_tx,
            queue_rx: Mutex::new(queue_rx),
            max_output_chars,
        }
    }

    /// Register a new queued job and append it to the queue tail.
    ///
    /// The prompt is expected to be validated already.
    pub async fn create(&self, prompt: String) -> Job {
        let mut jobs = self.jobs.write().await;
        let job = Job::new(prompt, Utc::now());
        jobs.insert(job.id, job.clone());
        // Enqueue under the registry lock so queue order matches `created_at` order.
        if self.queue_tx.send(job.id).is_err() {
            tracing::error!(job_id = %job.id, "Job queue closed; job will never run");
        }
        job
    }

    /// Read-only snapshot of a job.
    pub async fn get(&self, id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Atomically merge `update` into the stored job and return the result.
    ///
    /// Rejects with [`CoreError::Conflict`] (leaving the record untouched) if
    /// the job is already terminal, the status change is not a legal single
    /// step, timestamps are supplied without a status change, or result
    /// fields (exit code, output, error) arrive without a move to a terminal
    /// status. Missing
    /// transition timestamps are filled with the current time and clamped so
    /// `created_at <= started_at <= finished_at` always holds.
    pub async fn update(&self, id: JobId, update: JobUpdate) -> Result<Job, CoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or_else(|| CoreError::NotFound {
            entity: "Job",
            id: id.to_string(),
        })?;

        if job.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "job {id} is already {}",
                job.status
            )));
        }
        match update.status {
            Some(next) if !job.status.can_transition_to(next) => {
                return Err(CoreError::Conflict(format!(
                    "job {id} cannot move from {} to {next}",
                    job.status
                )));
            }
            None if update.started_at.is_some() || update.finished_at.is_some() => {
                return Err(CoreError::Conflict(
                    "lifecycle timestamps can only change together with status".into(),
                ));
            }
            _ => {}
        }
        let carries_result = update.exit_code.is_some()
            || update.stdout.is_some()
            || update.stderr.is_some()
            || update.error.is_some();
        if carries_result && !update.status.is_some_and(JobStatus::is_terminal) {
            return Err(CoreError::Conflict(
                "results can only be recorded when the job finishes".into(),
            ));
        }

        let now = Utc::now();
        if let Some(next) = update.status {
            if next == JobStatus::Running {
                let at = update.started_at.unwrap_or(now).max(job.created_at);
                job.started_at = Some(at);
            } else {
                let floor = job.started_at.unwrap_or(job.created_at);
                let at = update.finished_at.unwrap_or(now).max(floor);
                job.finished_at = Some(at);
            }
            job.status = next;
        }
        if let Some(code) = update.exit_code {
            job.exit_code = Some(code);
        }
        if let Some(stdout) = update.stdout {
            job.stdout = Some(truncate_output(stdout, self.max_output_chars));
        }
        if let Some(stderr) = update.stderr {
            job.stderr = Some(truncate_output(stderr, self.max_output_chars));
        }
        if let Some(error) = update.error {
            job.error = Some(error);
        }

        Ok(job.clone())
    }

    /// Wait for the next queued job id.
    ///
    /// Suspends while the queue is empty. Concurrent callers are served one
    /// at a time in FIFO order; each id is handed out exactly once. Safe to
    /// use inside `tokio::select!`.
    pub async fn next_queued(&self) -> Option<JobId> {
        self.queue_rx.lock().await.recv().await
    }

    /// Count queued and running jobs.
    pub async fn metrics(&self) -> JobMetrics {
        let jobs = self.jobs.read().await;
        jobs.values()
            .fold(JobMetrics::default(), |mut acc, job| {
                match job.status {
                    JobStatus::Queued => acc.queued += 1,
                    JobStatus::Running => acc.running += 1,
                    JobStatus::Succeeded | JobStatus::Failed => {}
                }
                acc
            })
    }

    /// Total number of jobs ever created.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
