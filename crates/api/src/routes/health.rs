use axum::extract::State;
use axum::{routing::get, Json, Router};
use bridge_core::wire::HealthResponse;
use chrono::Utc;

use crate::state::AppState;

/// GET /health -- returns queue depth and in-flight count. No auth required.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let metrics = state.store.metrics().await;

    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        time: Utc::now(),
        queued: metrics.queued,
        running: metrics.running,
    })
}

/// Mount health check routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
