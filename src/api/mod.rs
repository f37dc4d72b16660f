//! HTTP API module
//!
//! The command surface and observer endpoints: timer commands, snapshot
//! listings, the server-sent event stream, and settings/preset CRUD.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", post(start_timer_handler).get(list_timers_handler))
        .route("/timers/:id/pause", post(pause_timer_handler))
        .route("/timers/:id/resume", post(resume_timer_handler))
        .route("/timers/:id/stop", post(stop_timer_handler))
        .route("/timers/:id/restart", post(restart_timer_handler))
        .route("/timers/:id", delete(clear_timer_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/settings", get(get_settings_handler).put(update_settings_handler))
        .route("/presets", get(get_presets_handler).put(update_presets_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
