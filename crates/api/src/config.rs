use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bridge_core::execution::ExecutorConfig;

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// Everything except the shared secret has a default suitable for running
/// next to a local checkout.
#[derive(Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8787`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Shared secret callers must present on `/jobs` routes.
    pub token: String,
    /// Longest accepted prompt, in characters (default: `12000`).
    pub max_prompt_chars: usize,
    /// Longest stored stdout/stderr, in characters (default: `30000`).
    pub max_output_chars: usize,
    /// Number of worker loops draining the queue (default: `1`).
    pub workers: usize,
    /// External command, prompt mode, timeout and working directory.
    pub executor: ExecutorConfig,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token", &"<redacted>")
            .field("max_prompt_chars", &self.max_prompt_chars)
            .field("max_output_chars", &self.max_output_chars)
            .field("workers", &self.workers)
            .field("executor", &self.executor)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default    |
    /// |---------------------------|------------|
    /// | `BRIDGE_TOKEN`            | (required) |
    /// | `BRIDGE_HOST`             | `0.0.0.0`  |
    /// | `BRIDGE_PORT`             | `8787`     |
    /// | `BRIDGE_REPO_PATH`        | `.`        |
    /// | `BRIDGE_MAX_PROMPT_CHARS` | `12000`    |
    /// | `BRIDGE_MAX_OUTPUT_CHARS` | `30000`    |
    /// | `BRIDGE_WORKERS`          | `1`        |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`       |
    /// | `CODEX_COMMAND`           | `codex`    |
    /// | `CODEX_PROMPT_MODE`       | `arg`      |
    /// | `CODEX_TIMEOUT_SEC`       | `1800`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("BRIDGE_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("BRIDGE_TOKEN"))?;

        let host = lookup("BRIDGE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(&lookup, "BRIDGE_PORT", 8787u16)?;
        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;
        let max_prompt_chars = parse_or(&lookup, "BRIDGE_MAX_PROMPT_CHARS", 12_000usize)?;
        let max_output_chars = parse_or(&lookup, "BRIDGE_MAX_OUTPUT_CHARS", 30_000usize)?;

        let workers = parse_or(&lookup, "BRIDGE_WORKERS", 1usize)?;
        if workers == 0 {
            return Err(ConfigError::Invalid {
                key: "BRIDGE_WORKERS",
                value: "0".into(),
                reason: "at least one worker is required".into(),
            });
        }

        let timeout_secs = parse_or(&lookup, "CODEX_TIMEOUT_SEC", 1800u64)?;
        let executor = ExecutorConfig {
            command: lookup("CODEX_COMMAND").unwrap_or_else(|| "codex".into()),
            prompt_mode: lookup("CODEX_PROMPT_MODE").unwrap_or_else(|| "arg".into()),
            timeout: Duration::from_secs(timeout_secs),
            working_dir: PathBuf::from(lookup("BRIDGE_REPO_PATH").unwrap_or_else(|| ".".into())),
        };

        Ok(Self {
            host,
            port,
            request_timeout_secs,
            token,
            max_prompt_chars,
            max_output_chars,
            workers,
            executor,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}
