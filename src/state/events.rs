//! Broadcast events consumed by presentation observers

use serde::{Deserialize, Serialize};

use super::timer::Timer;

/// State-change notifications for every surface watching the registry
/// (main list, floating per-timer windows, tray title).
///
/// Observers hold no authoritative state; full snapshots ride along where
/// a surface needs more than the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TimerEvent {
    /// A brand-new timer; the window layer spawns a floating surface.
    Started { timer: Timer },
    /// A timer restarted in place; the existing floating surface is reused.
    Restarted { timer: Timer },
    /// Per-second liveness while running.
    Tick { id: u64, remaining: u64 },
    Paused { id: u64 },
    Resumed { id: u64 },
    /// Manual stop; deliberately never accompanied by a notification.
    Stopped { id: u64 },
    /// Natural completion. `show_animation` is the policy flag read at
    /// the moment of firing, for the floating surface.
    Completed { id: u64, show_animation: bool },
    Cleared { id: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tag_and_camel_case() {
        let json = serde_json::to_value(TimerEvent::Completed { id: 3, show_animation: true })
            .expect("serializable");
        assert_eq!(json["event"], "completed");
        assert_eq!(json["id"], 3);
        assert_eq!(json["showAnimation"], true);
    }

    #[test]
    fn tick_carries_remaining_seconds() {
        let json = serde_json::to_value(TimerEvent::Tick { id: 7, remaining: 59 })
            .expect("serializable");
        assert_eq!(json["event"], "tick");
        assert_eq!(json["remaining"], 59);
    }
}
