use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::wait::WaitPolicy;

/// Errors raised while loading [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
#[error("{key} has invalid value '{value}': {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Client settings loaded from environment variables.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server root URL (default: `http://127.0.0.1:8787`).
    pub base_url: String,
    /// Shared secret; empty when unset. Only `/health` works without it.
    pub token: String,
    /// Per-request timeout (default: 20s).
    pub http_timeout: Duration,
    /// Poll interval (default 2s, at least 1s) and max wait (default 900s).
    pub wait: WaitPolicy,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("http_timeout", &self.http_timeout)
            .field("wait", &self.wait)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `BRIDGE_BASE_URL`          | `http://127.0.0.1:8787` |
    /// | `BRIDGE_TOKEN`             | (empty)                 |
    /// | `BRIDGE_HTTP_TIMEOUT_SEC`  | `20`                    |
    /// | `BRIDGE_POLL_INTERVAL_SEC` | `2`                     |
    /// | `BRIDGE_MAX_WAIT_SEC`      | `900`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("BRIDGE_BASE_URL")
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| "http://127.0.0.1:8787".into());
        let token = lookup("BRIDGE_TOKEN")
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        let http_timeout = parse_or(&lookup, "BRIDGE_HTTP_TIMEOUT_SEC", 20u64)?;
        let poll_interval = parse_or(&lookup, "BRIDGE_POLL_INTERVAL_SEC", 2u64)?;
        let max_wait = parse_or(&lookup, "BRIDGE_MAX_WAIT_SEC", 900u64)?;

        Ok(Self {
            base_url,
            token,
            http_timeout: Duration::from_secs(http_timeout),
            wait: WaitPolicy::new(
                Duration::from_secs(poll_interval),
                Duration::from_secs(max_wait),
            ),
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
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}
