use std::sync::Arc;

use bridge_core::store::JobStore;

use crate::auth::TokenVerifier;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Job registry and work queue, shared with the worker loops.
    pub store: Arc<JobStore>,
    /// Server configuration (prompt limits are read by handlers).
    pub config: Arc<ServerConfig>,
    /// Credential check used by the [`Authenticated`](crate::middleware::auth::Authenticated) extractor.
    pub verifier: Arc<dyn TokenVerifier>,
}
