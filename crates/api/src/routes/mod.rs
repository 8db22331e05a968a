pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the authenticated route tree.
///
/// ```text
/// /jobs          submit (POST)
/// /jobs/{id}     query (GET)
/// ```
///
/// `/health` is mounted separately by [`crate::router::build_app_router`]
/// and needs no credential.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(jobs::router())
}
