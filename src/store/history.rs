//! Terminal timer history persistence

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::state::Timer;

pub const HISTORY_FILE: &str = "timers.json";

/// Most recent terminal timers kept on disk; mirrors the registry cap.
const HISTORY_CAP: usize = 20;

/// Load terminal history, newest first. Running or paused records from a
/// previous process are dropped; a missing or unreadable file is an empty
/// history, never an error.
pub fn load(path: &Path) -> Vec<Timer> {
    match read(path) {
        Ok(timers) => timers,
        Err(e) => {
            warn!("Failed to load timer history, starting empty: {:#}", e);
            Vec::new()
        }
    }
}

fn read(path: &Path) -> Result<Vec<Timer>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("unable to read history file {}", path.display()))?;
    let timers: Vec<Timer> = serde_json::from_str(&data)
        .with_context(|| format!("invalid history file {}", path.display()))?;
    let mut terminal: Vec<Timer> = timers
        .into_iter()
        .filter(|timer| timer.status.is_terminal())
        .collect();
    terminal.sort_by(|a, b| b.id.cmp(&a.id));
    terminal.truncate(HISTORY_CAP);
    Ok(terminal)
}

/// Write the terminal snapshots, pretty-printed, newest first.
pub fn save(path: &Path, timers: &[Timer]) -> Result<()> {
    let mut terminal: Vec<&Timer> = timers
        .iter()
        .filter(|timer| timer.status.is_terminal())
        .collect();
    terminal.sort_by(|a, b| b.id.cmp(&a.id));
    terminal.truncate(HISTORY_CAP);
    let text = serde_json::to_string_pretty(&terminal)?;
    fs::write(path, text)
        .with_context(|| format!("unable to write history file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::state::TimerStatus;

    use super::*;

    fn terminal_timer(id: u64, status: TimerStatus) -> Timer {
        let at = Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid epoch");
        Timer {
            id,
            label: format!("timer-{}", id),
            duration_seconds: 60,
            status,
            started_at: at,
            ends_at: Some(at + Duration::seconds(60)),
            remaining_at_pause: None,
        }
    }

    #[test]
    fn missing_file_is_empty_history() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(load(&dir.path().join(HISTORY_FILE)).is_empty());
    }

    #[test]
    fn corrupt_file_is_empty_history() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(HISTORY_FILE);
        fs::write(&path, "[{broken").expect("writes");
        assert!(load(&path).is_empty());
    }

    #[test]
    fn round_trip_keeps_terminal_snapshots_newest_first() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(HISTORY_FILE);
        let timers = vec![
            terminal_timer(1, TimerStatus::Stopped),
            terminal_timer(3, TimerStatus::Completed),
            terminal_timer(2, TimerStatus::Completed),
        ];
        save(&path, &timers).expect("saves");
        let loaded = load(&path);
        let ids: Vec<u64> = loaded.iter().map(|timer| timer.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(loaded[0].label, "timer-3");
    }

    #[test]
    fn load_drops_non_terminal_records() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(HISTORY_FILE);
        let mut running = terminal_timer(5, TimerStatus::Completed);
        running.status = TimerStatus::Running;
        let json = serde_json::to_string(&vec![running, terminal_timer(4, TimerStatus::Stopped)])
            .expect("serializable");
        fs::write(&path, json).expect("writes");
        let loaded = load(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 4);
    }

    #[test]
    fn save_and_load_cap_at_twenty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(HISTORY_FILE);
        let timers: Vec<Timer> = (1..=30)
            .map(|id| terminal_timer(id, TimerStatus::Completed))
            .collect();
        save(&path, &timers).expect("saves");
        let loaded = load(&path);
        assert_eq!(loaded.len(), 20);
        assert_eq!(loaded[0].id, 30);
        assert_eq!(loaded[19].id, 11);
    }
}
