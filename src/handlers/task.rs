use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::{AppError, AppResult};
use crate::limiter::Admission;
use crate::models::TaskRequest;
use crate::state::AppState;

// POST /task: validate the user id, run admission control, then place
// the job on the user's queue before acknowledging. Only execution is
// asynchronous; the 202 means the job is actually queued.
#[axum::debug_handler]
pub async fn submit_task(
    State(state): State<AppState>,
    payload: Option<Json<TaskRequest>>,
) -> AppResult<Response> {
    // An unreadable body is treated the same as a missing user id.
    let user_id = payload
        .and_then(|Json(request)| request.user_id)
        .unwrap_or_default();
    let user_id = user_id.trim();

    if user_id.is_empty() {
        return Err(AppError::Validation("User ID is required".into()));
    }

    match state.limiter.admit(user_id) {
        Admission::Denied => return Err(AppError::RateLimited),
        Admission::Allowed => {}
    }

    let job_id = state.registry.enqueue(user_id)?;
    tracing::debug!("Queued job {} for user {}", job_id, user_id);

    Ok((StatusCode::ACCEPTED, "Task queued").into_response())
}
