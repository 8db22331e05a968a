//! Background worker loop.
//!
//! Each [`JobWorker`] is a long-lived Tokio task that takes job ids off the
//! store's FIFO queue one at a time, runs them through the executor and
//! writes the outcome back. Nothing that happens to a single job stops the
//! loop: execution errors and executor panics become `failed` records.

use std::sync::Arc;
use std::time::Instant;

use bridge_core::execution::PromptExecutor;
use bridge_core::job::JobUpdate;
use bridge_core::store::JobStore;
use bridge_core::types::JobId;
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A single consumer of the job queue.
pub struct JobWorker<E> {
    id: usize,
    store: Arc<JobStore>,
    executor: Arc<E>,
}

impl<E: PromptExecutor> JobWorker<E> {
    pub fn new(id: usize, store: Arc<JobStore>, executor: Arc<E>) -> Self {
        Self {
            id,
            store,
            executor,
        }
    }

    /// Run the worker loop until the cancellation token is triggered.
    ///
    /// Cancellation is only observed between jobs; a job that has started
    /// runs until it finishes or hits the executor timeout.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(worker = self.id, "Job worker started");

        loop {
            let job_id = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(worker = self.id, "Job worker shutting down");
                    break;
                }
                next = self.store.next_queued() => match next {
                    Some(id) => id,
                    None => {
                        tracing::info!(worker = self.id, "Job queue closed");
                        break;
                    }
                },
            };

            self.process(job_id).await;
        }
    }

    /// Drive one job from `queued` to a terminal status.
    pub async fn process(&self, job_id: JobId) {
        let job = match self.store.update(job_id, JobUpdate::started(Utc::now())).await {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(worker = self.id, %job_id, error = %e, "Skipping job");
                return;
            }
        };
        tracing::info!(worker = self.id, %job_id, "Job started");

        // Run on its own task so a panicking executor cannot take the loop down.
        let executor = Arc::clone(&self.executor);
        let prompt = job.prompt;
        let started = Instant::now();
        let outcome = tokio::spawn(async move { executor.run(&prompt).await }).await;

        let update = match outcome {
            Ok(Ok(output)) => JobUpdate::completed(output, Utc::now()),
            Ok(Err(e)) => {
                tracing::warn!(worker = self.id, %job_id, error = %e, "Job execution failed");
                JobUpdate::errored(e.to_string(), Utc::now())
            }
            Err(join_err) => {
                tracing::error!(worker = self.id, %job_id, error = %join_err, "Executor panicked");
                JobUpdate::errored(format!("executor crashed: {join_err}"), Utc::now())
            }
        };

        match self.store.update(job_id, update).await {
            Ok(done) => tracing::info!(
                worker = self.id,
                %job_id,
                status = %done.status,
                exit_code = ?done.exit_code,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Job finished",
            ),
            Err(e) => {
                tracing::error!(worker = self.id, %job_id, error = %e, "Failed to record job outcome")
            }
        }
    }
}

/// Spawn `count` worker loops sharing one store and executor.
///
/// With `count == 1` jobs run strictly one at a time in submission order.
pub fn spawn_workers<E: PromptExecutor>(
    count: usize,
    store: Arc<JobStore>,
    executor: Arc<E>,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|id| {
            let worker = JobWorker::new(id, Arc::clone(&store), Arc::clone(&executor));
            tokio::spawn(worker.run(cancel.clone()))
        })
        .collect()
}
