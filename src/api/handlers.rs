//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{AppState, TimerMode, TimerSettings, TimerSnapshot};
use super::responses::{ApiResponse, ErrorResponse, HealthResponse, StatusResponse};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(context: &str, e: String) -> ApiError {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("{}: {}", context, e))),
    )
}

fn bad_request(message: String) -> ApiError {
    warn!("Rejected request: {}", message);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn respond(
    result: Result<TimerSnapshot, String>,
    context: &str,
    message: impl FnOnce(&TimerSnapshot) -> String,
) -> Result<Json<ApiResponse>, ApiError> {
    match result {
        Ok(timer) => {
            let message = message(&timer);
            info!("{}", message);
            Ok(Json(ApiResponse::new(message, timer)))
        }
        Err(e) => Err(internal_error(context, e)),
    }
}

/// Handle POST /timer/toggle - Start or pause the countdown
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    respond(state.toggle_running(), "Failed to toggle timer", |timer| {
        if timer.running {
            format!("Timer started ({} left)", timer.display)
        } else {
            format!("Timer paused ({} left)", timer.display)
        }
    })
}

/// Handle POST /timer/reset - Refill the current interval and pause
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    respond(state.reset(), "Failed to reset timer", |timer| {
        format!("Timer reset to {}", timer.display)
    })
}

/// Handle POST /timer/mode/:mode - Switch to another interval kind
pub async fn switch_mode_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let mode: TimerMode = mode.parse().map_err(bad_request)?;
    respond(state.switch_mode(mode), "Failed to switch mode", |timer| {
        format!("Switched to {} ({})", timer.mode, timer.display)
    })
}

/// Handle GET /settings - Return current settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerSettings>, ApiError> {
    state
        .store
        .settings()
        .map(Json)
        .map_err(|e| internal_error("Failed to read settings", e))
}

/// Handle PUT /settings - Replace settings wholesale
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<TimerSettings>,
) -> Result<Json<ApiResponse>, ApiError> {
    settings.validate().map_err(bad_request)?;
    respond(state.update_settings(settings), "Failed to update settings", |_| {
        "Settings updated".to_string()
    })
}

/// Handle GET /timer - Return current timer and server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let timer = state
        .get_snapshot()
        .map_err(|e| internal_error("Failed to get timer state", e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
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
