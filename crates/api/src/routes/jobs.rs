//! Route definitions for the `/jobs` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes for the `/jobs` resource.
///
/// ```text
/// POST   /jobs          -> submit_job
/// GET    /jobs/{id}     -> get_job
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(jobs::submit_job))
        .route("/jobs/{id}", get(jobs::get_job))
}
