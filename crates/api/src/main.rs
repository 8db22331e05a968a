use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bridge_core::execution::CommandExecutor;
use bridge_core::store::JobStore;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bridge_api::auth::SharedSecretVerifier;
use bridge_api::cli::Cli;
use bridge_api::config::ServerConfig;
use bridge_api::engine;
use bridge_api::router::build_app_router;
use bridge_api::state::AppState;

/// How long to wait for worker loops after the server stops.
const WORKER_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bridge_api=debug,bridge_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let cli = Cli::parse();
    let repo_path = cli.repo_path_or_env();
    let env_file = cli.env_file_in(&repo_path);
    if env_file.exists() {
        // Values already in the environment win over the file.
        dotenvy::from_path(&env_file)
            .with_context(|| format!("failed to load env file {}", env_file.display()))?;
        tracing::info!(path = %env_file.display(), "Loaded env file");
    }

    let mut config = ServerConfig::from_env()?;
    cli.apply_overrides(&mut config);
    config.executor.working_dir = std::fs::canonicalize(&config.executor.working_dir)
        .with_context(|| {
            format!(
                "repository path {} is not accessible",
                config.executor.working_dir.display()
            )
        })?;

    let executor = CommandExecutor::new(config.executor.clone());
    let resolved = executor
        .resolve()
        .context("CODEX_COMMAND / CODEX_PROMPT_MODE are invalid")?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        repo_path = %executor.config().working_dir.display(),
        program = %resolved.program,
        prompt_mode = ?resolved.mode,
        timeout_secs = executor.config().timeout.as_secs(),
        workers = config.workers,
        "Loaded bridge configuration",
    );

    // --- Job store + workers ---
    let store = Arc::new(JobStore::new(config.max_output_chars));
    let cancel = CancellationToken::new();
    let worker_handles = engine::spawn_workers(
        config.workers,
        Arc::clone(&store),
        Arc::new(executor),
        cancel.clone(),
    );

    // --- App state ---
    let verifier = Arc::new(SharedSecretVerifier::new(&config.token));
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        verifier,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("BRIDGE_HOST is not a valid IP address")?,
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Codex bridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, stopping workers");
    cancel.cancel();
    for handle in worker_handles {
        if tokio::time::timeout(WORKER_SHUTDOWN_GRACE, handle).await.is_err() {
            tracing::warn!("Worker still busy after grace period; abandoning running job");
        }
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
