//! Command-line arguments for the `codex-bridge` binary.
//!
//! Flags take precedence over the environment and the env file.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::ServerConfig;

#[derive(Debug, Parser)]
#[command(name = "codex-bridge", version, about = "Queue prompts and run them through an external command")]
pub struct Cli {
    /// Address to bind (overrides BRIDGE_HOST).
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides BRIDGE_PORT).
    #[arg(long)]
    pub port: Option<u16>,

    /// Repository the command runs in (overrides BRIDGE_REPO_PATH).
    #[arg(long)]
    pub repo_path: Option<PathBuf>,

    /// Env file, relative to the repository path.
    #[arg(long, default_value = ".worker.env")]
    pub env_file: PathBuf,
}

impl Cli {
    /// Repository path from the flag, then `BRIDGE_REPO_PATH`, then `.`.
    pub fn repo_path_or_env(&self) -> PathBuf {
        self.repo_path
            .clone()
            .or_else(|| std::env::var_os("BRIDGE_REPO_PATH").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Location of the env file for a given repository path.
    pub fn env_file_in(&self, repo_path: &Path) -> PathBuf {
        repo_path.join(&self.env_file)
    }

    /// Apply flag values on top of an environment-derived config.
    pub fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(repo_path) = &self.repo_path {
            config.executor.working_dir = repo_path.clone();
        }
    }
}
