//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::Timer;

/// Envelope for timer command endpoints.
///
/// `status` is `"ok"` when the command took effect, `"ignored"` when it
/// referenced an unknown or status-incompatible timer (idempotent by
/// design), and `"error"` for rejected input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<Timer>,
}

impl CommandResponse {
    /// Create a new command response
    pub fn new(status: &str, message: &str, timer: Option<Timer>) -> Self {
        Self {
            status: status.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Command took effect on `timer`
    pub fn ok(message: &str, timer: Timer) -> Self {
        Self::new("ok", message, Some(timer))
    }

    /// Silent no-op: unknown id or incompatible status
    pub fn ignored(message: &str) -> Self {
        Self::new("ignored", message, None)
    }

    /// Rejected input, the only user-visible error
    pub fn error(message: &str) -> Self {
        Self::new("error", message, None)
    }
}

/// Status summary for the tray and list surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub running: usize,
    pub paused: usize,
    pub terminal: usize,
    /// Soonest-due countdown preformatted for the tray, empty when idle
    pub tray_title: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
