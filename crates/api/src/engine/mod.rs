//! Job execution engine.
//!
//! Contains the worker loops that drain the job queue and run each job
//! through the configured executor.

pub mod worker;

pub use worker::{spawn_workers, JobWorker};
