//! Handlers for the `/jobs` resource.
//!
//! Both endpoints require a credential via [`Authenticated`]. Handlers only
//! validate, authenticate and translate to [`JobStore`](bridge_core::store::JobStore)
//! calls; execution happens in the worker engine.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bridge_core::error::CoreError;
use bridge_core::types::JobId;
use bridge_core::validation::{prompt_too_long, validate_prompt};
use bridge_core::wire::{JobSnapshot, SubmitJobRequest, SubmitJobResponse};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::Authenticated;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// Extra body bytes allowed beyond the encoded prompt itself.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Largest `POST /jobs` body accepted for a given prompt limit.
///
/// One character can take up to 12 bytes of JSON (an escaped surrogate
/// pair), so a prompt at the limit always fits.
pub fn submit_body_limit(max_prompt_chars: usize) -> usize {
    max_prompt_chars
        .saturating_mul(12)
        .saturating_add(BODY_OVERHEAD_BYTES)
}

/// POST /jobs
///
/// Queue a prompt for execution. Returns 202 with the job id, its initial
/// status and the URL to poll. An empty body is treated as `{}`.
pub async fn submit_job(
    _auth: Authenticated,
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<impl IntoResponse> {
    let body = body.map_err(|e| body_rejection(e, state.config.max_prompt_chars))?;
    let input = parse_submit_body(&body)?;
    let prompt = validate_prompt(&input.prompt, state.config.max_prompt_chars)?;
    let job = state.store.create(prompt).await;

    tracing::info!(
        job_id = %job.id,
        prompt_chars = job.prompt.chars().count(),
        "Job submitted",
    );

    let response = SubmitJobResponse::for_job(&job);
    Ok((
        StatusCode::ACCEPTED,
        [(LOCATION, response.status_url.clone())],
        Json(response),
    ))
}

fn body_rejection(rejection: BytesRejection, max_prompt_chars: usize) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!(error = %rejection, "Rejected oversized job body");
        return AppError::Core(prompt_too_long(max_prompt_chars));
    }
    AppError::BadRequest(format!("failed to read request body: {}", rejection.body_text()))
}

fn parse_submit_body(body: &[u8]) -> AppResult<SubmitJobRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SubmitJobRequest {
            prompt: String::new(),
        });
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected unparsable job body");
        AppError::BadRequest("invalid json body".into())
    })
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// GET /jobs/{id}
///
/// Current snapshot of a job. Ids that are unknown or not even well-formed
/// both yield 404.
pub async fn get_job(
    _auth: Authenticated,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: raw_id.clone(),
        })
    };

    let job_id: JobId = raw_id.trim().parse().map_err(|_| not_found())?;
    let job = state.store.get(job_id).await.ok_or_else(not_found)?;

    Ok(Json(JobSnapshot::from(job)))
}
