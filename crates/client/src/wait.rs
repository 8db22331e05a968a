use std::time::Duration;

use bridge_core::wire::JobSnapshot;

/// Shortest poll interval the client will use.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How often to poll and how long to keep trying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl WaitPolicy {
    /// Build a policy, raising `poll_interval` to [`MIN_POLL_INTERVAL`].
    pub fn new(poll_interval: Duration, max_wait: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            max_wait,
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(900))
    }
}

/// Result of waiting on a job.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    /// The job reached `succeeded` or `failed`.
    Finished(JobSnapshot),
    /// `max_wait` elapsed first; carries the last snapshot seen.
    TimedOut(JobSnapshot),
}

impl WaitOutcome {
    pub fn snapshot(&self) -> &JobSnapshot {
        match self {
            WaitOutcome::Finished(s) | WaitOutcome::TimedOut(s) => s,
        }
    }

    pub fn into_snapshot(self) -> JobSnapshot {
        match self {
            WaitOutcome::Finished(s) | WaitOutcome::TimedOut(s) => s,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, WaitOutcome::Finished(_))
    }
}
