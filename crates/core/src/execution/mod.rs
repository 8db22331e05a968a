//! Running a prompt through the configured external command.
//!
//! [`PromptExecutor`] is the seam the worker loop depends on;
//! [`CommandExecutor`] is the production implementation that spawns a
//! subprocess in the repository directory with a hard timeout.

pub mod command;
pub mod executor;
pub mod subprocess;

pub use executor::{
    CommandExecutor, ExecutionError, ExecutionOutput, ExecutorConfig, PromptExecutor, PromptMode,
};

/// Shared test helpers for executor tests.
#[cfg(test)]
pub(crate) mod test_helpers {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::executor::ExecutorConfig;

    /// Build an [`ExecutorConfig`] for tests: 5-second timeout, current dir.
    pub fn config(command: &str, prompt_mode: &str) -> ExecutorConfig {
        ExecutorConfig {
            command: command.to_string(),
            prompt_mode: prompt_mode.to_string(),
            timeout: Duration::from_secs(5),
            working_dir: PathBuf::from("."),
        }
    }
}
