//! Prompt execution interface and the subprocess-backed implementation.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tokio::process::Command;

use super::command::split_command_line;
use super::subprocess;

/// How the prompt is handed to the external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Append the prompt as the final command-line argument.
    Arg,
    /// Write the prompt to the child's stdin, then close it.
    Stdin,
}

impl FromStr for PromptMode {
    type Err = ExecutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arg" => Ok(Self::Arg),
            "stdin" => Ok(Self::Stdin),
            other => Err(ExecutionError::BadConfig(format!(
                "prompt mode must be 'arg' or 'stdin', got '{other}'"
            ))),
        }
    }
}

/// External command configuration, supplied once at startup.
///
/// Kept in raw form and resolved on every call, so a bad value surfaces as a
/// per-job [`ExecutionError::BadConfig`] as well as at startup.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Command template, split with shell-like quoting rules.
    pub command: String,
    /// `arg` or `stdin`.
    pub prompt_mode: String,
    /// Hard wall-clock limit for one run.
    pub timeout: Duration,
    /// Working directory for the child process.
    pub working_dir: PathBuf,
}

/// Captured result of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    /// Process exit code (`-1` if killed by a signal).
    pub exit_code: i32,
    /// Complete stdout, decoded lossily as UTF-8.
    pub stdout: String,
    /// Complete stderr, decoded lossily as UTF-8.
    pub stderr: String,
}

impl ExecutionOutput {
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// The command could not be run to completion.
///
/// A non-zero exit is *not* an error; it is reported through
/// [`ExecutionOutput::exit_code`].
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("invalid command configuration: {0}")]
    BadConfig(String),

    #[error("command timed out after {}s", .timeout.as_secs_f64())]
    Timeout { timeout: Duration },

    #[error("failed to spawn command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("I/O error while running command: {0}")]
    Io(#[source] std::io::Error),
}

/// Runs one prompt to completion.
///
/// The worker loop is generic over this trait so tests can substitute a
/// scripted executor.
pub trait PromptExecutor: Send + Sync + 'static {
    fn run(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<ExecutionOutput, ExecutionError>> + Send;
}

/// Resolved program, leading arguments and prompt mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub program: String,
    pub args: Vec<String>,
    pub mode: PromptMode,
}

/// [`PromptExecutor`] that spawns the configured external command.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    config: ExecutorConfig,
}

impl CommandExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Split the command template and parse the prompt mode.
    pub fn resolve(&self) -> Result<ResolvedCommand, ExecutionError> {
        let mode: PromptMode = self.config.prompt_mode.parse()?;
        let mut words = split_command_line(&self.config.command)
            .map_err(|e| ExecutionError::BadConfig(format!("command template: {e}")))?;
        if words.is_empty() {
            return Err(ExecutionError::BadConfig("command template is empty".into()));
        }
        let program = words.remove(0);
        Ok(ResolvedCommand {
            program,
            args: words,
            mode,
        })
    }
}

impl PromptExecutor for CommandExecutor {
    async fn run(&self, prompt: &str) -> Result<ExecutionOutput, ExecutionError> {
        let resolved = self.resolve()?;

        let mut cmd = Command::new(&resolved.program);
        cmd.args(&resolved.args).current_dir(&self.config.working_dir);

        let stdin = match resolved.mode {
            PromptMode::Arg => {
                cmd.arg(prompt);
                None
            }
            PromptMode::Stdin => Some(prompt.as_bytes().to_vec()),
        };

        subprocess::run_command(&mut cmd, stdin, self.config.timeout).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
