//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, warn};

use crate::state::{AppState, CommandError, Preset, Settings, Timer, TimerStatus};

use super::responses::{CommandResponse, HealthResponse, StatusResponse};

/// Request body for start and restart commands: raw parser input.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub input: String,
}

/// Handle POST /timers - parse free text and start a countdown
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), StatusCode> {
    match state.start_timer(&request.input) {
        Ok(timer) => Ok((
            StatusCode::CREATED,
            Json(CommandResponse::ok("Timer started", timer)),
        )),
        Err(CommandError::InvalidInput) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(CommandResponse::error("Invalid time format")),
        )),
        Err(CommandError::Internal(e)) => {
            error!("Failed to start timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /timers - snapshots, active first then recent history
pub async fn list_timers_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Timer>>, StatusCode> {
    match state.list_timers() {
        Ok(timers) => Ok(Json(timers)),
        Err(e) => {
            error!("Failed to list timers: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timers/:id/pause
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<CommandResponse>, StatusCode> {
    command_outcome(state.pause_timer(id), "Timer paused", "Pause ignored")
}

/// Handle POST /timers/:id/resume
pub async fn resume_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<CommandResponse>, StatusCode> {
    command_outcome(state.resume_timer(id), "Timer resumed", "Resume ignored")
}

/// Handle POST /timers/:id/stop
pub async fn stop_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<CommandResponse>, StatusCode> {
    command_outcome(state.stop_timer(id), "Timer stopped", "Stop ignored")
}

/// Handle POST /timers/:id/restart - restart in place, reusing the id
pub async fn restart_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<StartRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), StatusCode> {
    match state.restart_timer(id, &request.input) {
        Ok(Some(timer)) => Ok((
            StatusCode::OK,
            Json(CommandResponse::ok("Timer restarted", timer)),
        )),
        Ok(None) => Ok((
            StatusCode::OK,
            Json(CommandResponse::ignored("Restart ignored")),
        )),
        Err(CommandError::InvalidInput) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(CommandResponse::error("Invalid time format")),
        )),
        Err(CommandError::Internal(e)) => {
            error!("Failed to restart timer {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle DELETE /timers/:id - clear a terminal timer from history
pub async fn clear_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<CommandResponse>, StatusCode> {
    command_outcome(state.clear_timer(id), "Timer cleared", "Clear ignored")
}

/// Handle GET /events - server-sent event stream for observers
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.subscribe();
    let stream = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match Event::default().json_data(&event) {
                    Ok(sse_event) => return Some((Ok(sse_event), receiver)),
                    Err(e) => {
                        warn!("Failed to encode timer event: {}", e);
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /status - counts, tray title, and server metadata
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timers = match state.list_timers() {
        Ok(timers) => timers,
        Err(e) => {
            error!("Failed to read registry for status: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let running = timers
        .iter()
        .filter(|timer| timer.status == TimerStatus::Running)
        .count();
    let paused = timers
        .iter()
        .filter(|timer| timer.status == TimerStatus::Paused)
        .count();
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        running,
        paused,
        terminal: timers.len() - running - paused,
        tray_title: state.tray_title(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Handle GET /settings
pub async fn get_settings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Settings>, StatusCode> {
    state.get_settings().map(Json).map_err(internal)
}

/// Handle PUT /settings - replace and persist the settings document
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, StatusCode> {
    state.update_settings(settings).map(Json).map_err(internal)
}

/// Handle GET /presets
pub async fn get_presets_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Preset>>, StatusCode> {
    state.get_presets().map(Json).map_err(internal)
}

/// Handle PUT /presets - replace the preset catalog
pub async fn update_presets_handler(
    State(state): State<Arc<AppState>>,
    Json(presets): Json<Vec<Preset>>,
) -> Result<Json<Vec<Preset>>, StatusCode> {
    state.update_presets(presets).map(Json).map_err(internal)
}

/// Shared mapping for the pause/resume/stop/clear family: effect, silent
/// no-op, or internal failure.
fn command_outcome(
    result: Result<Option<Timer>, CommandError>,
    ok_message: &str,
    ignored_message: &str,
) -> Result<Json<CommandResponse>, StatusCode> {
    match result {
        Ok(Some(timer)) => Ok(Json(CommandResponse::ok(ok_message, timer))),
        Ok(None) => Ok(Json(CommandResponse::ignored(ignored_message))),
        Err(e) => Err(internal(e)),
    }
}

fn internal(e: CommandError) -> StatusCode {
    error!("Internal command failure: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
