//! Timer entity and status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a countdown timer.
///
/// `Stopped` and `Completed` are terminal; only `restart_in_place` or a
/// fresh `start` bring the id back to life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    Paused,
    Stopped,
    Completed,
}

impl TimerStatus {
    /// Running or paused: the timer still owns a live countdown.
    pub fn is_active(&self) -> bool {
        matches!(self, TimerStatus::Running | TimerStatus::Paused)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

/// One countdown instance. Observers only ever see clones of these;
/// the registry owns the authoritative records.
///
/// While running, `ends_at` is the authoritative time source; while
/// paused, `remaining_at_pause` is. Terminal timers freeze `ends_at`
/// at their final instant for history display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: u64,
    /// Free-text tag from the input; empty means untagged.
    #[serde(default)]
    pub label: String,
    /// Originally requested length, immutable once started.
    pub duration_seconds: u64,
    pub status: TimerStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_at_pause: Option<u64>,
}

impl Timer {
    /// Whole seconds left on the countdown at `now`, never negative.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        match self.status {
            TimerStatus::Running => self
                .ends_at
                .map(|ends_at| (ends_at - now).num_seconds().max(0) as u64)
                .unwrap_or(0),
            TimerStatus::Paused => self.remaining_at_pause.unwrap_or(0),
            TimerStatus::Stopped | TimerStatus::Completed => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid epoch")
    }

    fn running(seconds: u64) -> Timer {
        Timer {
            id: 1,
            label: String::new(),
            duration_seconds: seconds,
            status: TimerStatus::Running,
            started_at: epoch(),
            ends_at: Some(epoch() + Duration::seconds(seconds as i64)),
            remaining_at_pause: None,
        }
    }

    #[test]
    fn remaining_counts_down_and_clamps_at_zero() {
        let timer = running(90);
        assert_eq!(timer.remaining_at(epoch()), 90);
        assert_eq!(timer.remaining_at(epoch() + Duration::seconds(30)), 60);
        assert_eq!(timer.remaining_at(epoch() + Duration::seconds(500)), 0);
    }

    #[test]
    fn paused_remaining_ignores_the_clock() {
        let mut timer = running(90);
        timer.status = TimerStatus::Paused;
        timer.ends_at = None;
        timer.remaining_at_pause = Some(42);
        assert_eq!(timer.remaining_at(epoch() + Duration::seconds(1000)), 42);
    }

    #[test]
    fn terminal_timers_have_no_remaining() {
        let mut timer = running(90);
        timer.status = TimerStatus::Completed;
        assert_eq!(timer.remaining_at(epoch()), 0);
    }

    #[test]
    fn serializes_status_lowercase() {
        let json = serde_json::to_value(running(60)).expect("serializable");
        assert_eq!(json["status"], "running");
        assert_eq!(json["durationSeconds"], 60);
    }
}
