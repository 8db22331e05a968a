use std::process::ExitCode;

use anyhow::{ensure, Context};
use bridge_client::format::{format_health, format_job, format_submitted, DISPLAY_OUTPUT_CHARS};
use bridge_client::{BridgeClient, ClientConfig, WaitOutcome};
use bridge_core::job::JobStatus;
use bridge_core::types::JobId;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Submit prompts to a Codex bridge and check on them.
#[derive(Parser)]
#[command(name = "bridge-cli", version)]
struct Cli {
    /// Override BRIDGE_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue a prompt
    Submit {
        /// Prompt text (words are joined with spaces)
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
        /// Poll until the job finishes or BRIDGE_MAX_WAIT_SEC elapses
        #[arg(long)]
        wait: bool,
    },
    /// Show the current state of a job
    Status {
        /// Job id returned by `submit`
        job_id: JobId,
    },
    /// Show server health and queue depth
    Health {},
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bridge_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let client = BridgeClient::new(&config.base_url, &config.token, config.http_timeout)
        .context("failed to build HTTP client")?;

    match cli.command {
        Command::Submit { prompt, wait } => {
            ensure!(!config.token.is_empty(), "BRIDGE_TOKEN is not set");
            let prompt = prompt.join(" ");
            let created = client.create_job(&prompt).await?;
            println!("{}", format_submitted(&created));
            if !wait {
                return Ok(ExitCode::SUCCESS);
            }

            let outcome = client.wait_for_job(created.job_id, config.wait).await?;
            if let WaitOutcome::TimedOut(_) = &outcome {
                tracing::warn!(
                    job_id = %created.job_id,
                    max_wait_secs = config.wait.max_wait.as_secs(),
                    "Gave up waiting; job is still pending",
                );
            }
            let code = exit_code_for(&outcome);
            println!("{}", format_job(&outcome.into_snapshot(), DISPLAY_OUTPUT_CHARS));
            Ok(code)
        }
        Command::Status { job_id } => {
            ensure!(!config.token.is_empty(), "BRIDGE_TOKEN is not set");
            let job = client.get_job(job_id).await?;
            println!("{}", format_job(&job, DISPLAY_OUTPUT_CHARS));
            Ok(ExitCode::SUCCESS)
        }
        Command::Health {} => {
            let health = client.health().await?;
            println!("{}", format_health(&health));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 0 for success, 1 for a failed job, 2 when the wait ran out.
fn exit_code_for(outcome: &WaitOutcome) -> ExitCode {
    match outcome {
        WaitOutcome::Finished(job) if job.status == JobStatus::Succeeded => ExitCode::SUCCESS,
        WaitOutcome::Finished(_) => ExitCode::from(1),
        WaitOutcome::TimedOut(_) => ExitCode::from(2),
    }
}
