//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    error::ProgressError,
    progress::ProgressController,
    state::AppState,
};
use super::responses::{
    ApiResponse, AutoProgressRequest, HealthResponse, PublishProgressRequest, StatusResponse,
};

/// Outcome of a control endpoint
type ControlResult = Result<Json<ApiResponse>, StatusCode>;

/// Apply a controller action and describe the outcome
fn control<F>(state: &AppState, action: &str, op: F, message: &str) -> ControlResult
where
    F: FnOnce(&mut ProgressController) -> Result<(), ProgressError>,
{
    let outcome = state.with_progress(action, op).map_err(|e| {
        error!("Failed to {}: {}", action, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let progress = state.get_status().map_err(|e| {
        error!("Failed to get progress status: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    match outcome {
        Ok(()) => {
            info!("{} endpoint called", action);
            Ok(Json(ApiResponse::ok(message.to_string(), progress)))
        }
        Err(e) => {
            warn!("{} endpoint rejected: {}", action, e);
            Ok(Json(ApiResponse::error(e.to_string(), progress)))
        }
    }
}

/// Handle POST /pause - Pause auto progress
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    control(&state, "pause", |progress| progress.pause(), "Progress paused")
}

/// Handle POST /resume - Resume auto progress
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    control(&state, "resume", |progress| progress.resume(), "Progress resumed")
}

/// Handle POST /cancel - Stop auto progress for good
pub async fn cancel_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    control(&state, "cancel", |progress| progress.cancel(), "Progress cancelled")
}

/// Handle POST /reset - Restart from an empty bar
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    control(&state, "reset", |progress| progress.reset(), "Progress reset")
}

/// Handle POST /progress - Set the completed fraction by hand
pub async fn publish_progress_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishProgressRequest>,
) -> ControlResult {
    control(
        &state,
        "progress",
        |progress| progress.publish_progress(request.value),
        "Progress published",
    )
}

/// Handle POST /auto-progress - Configure a new auto progress duration
pub async fn auto_progress_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AutoProgressRequest>,
) -> ControlResult {
    control(
        &state,
        "auto-progress",
        |progress| progress.enable_auto_progress(request.duration_millis),
        "Auto progress enabled",
    )
}

/// Handle POST /divider - Add a divider at the current position
pub async fn divider_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    let added = state.with_progress("divider", |progress| progress.add_divider()).map_err(|e| {
        error!("Failed to add divider: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let progress = match state.get_status() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to get progress status: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    if added {
        info!("Divider endpoint called - divider added");
        Ok(Json(ApiResponse::ok("Divider added".to_string(), progress)))
    } else {
        Ok(Json(ApiResponse::ignored(
            "Divider already added to current position".to_string(),
            progress,
        )))
    }
}

/// Handle GET /status - Return current progress status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let progress = match state.get_status() {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to get progress status: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        progress,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
