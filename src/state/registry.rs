//! Timer registry and scheduling core
//!
//! The registry is the single owner of the authoritative timer collection
//! and the id counter. Every method takes an explicit `now` so tests drive
//! virtual time; the async layer above supplies the wall clock.

use chrono::{DateTime, Duration, Utc};

use crate::parse::ParsedInput;
use super::timer::{Timer, TimerStatus};

/// Most recent terminal timers retained as history.
const HISTORY_CAP: usize = 20;

/// What one scheduling pass produced: per-second liveness for every
/// running timer, plus the timers that just reached their deadline.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    /// `(id, remaining seconds)` for timers still counting down.
    pub ticks: Vec<(u64, u64)>,
    /// Snapshots of timers that completed on this pass.
    pub completed: Vec<Timer>,
}

#[derive(Debug)]
pub struct Registry {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self { timers: Vec::new(), next_id: 1 }
    }

    /// Rebuild from persisted history. Non-terminal records are dropped
    /// (running timers do not survive a restart) and the id counter seeds
    /// past the largest persisted id so ids are never reused.
    pub fn with_history(history: Vec<Timer>) -> Self {
        let mut timers: Vec<Timer> = history
            .into_iter()
            .filter(|timer| timer.status.is_terminal())
            .collect();
        timers.sort_by(|a, b| b.id.cmp(&a.id));
        timers.truncate(HISTORY_CAP);
        timers.reverse();
        let next_id = timers.iter().map(|timer| timer.id).max().unwrap_or(0) + 1;
        Self { timers, next_id }
    }

    /// Create and register a new running timer under a fresh id.
    pub fn start(&mut self, parsed: &ParsedInput, now: DateTime<Utc>) -> Timer {
        let id = self.next_id;
        self.next_id += 1;
        let timer = Self::build_running(id, parsed, now);
        self.timers.push(timer.clone());
        timer
    }

    /// Freeze a running timer, snapshotting its remaining seconds.
    /// No-op for unknown ids or any other status.
    pub fn pause(&mut self, id: u64, now: DateTime<Utc>) -> Option<Timer> {
        let timer = self.find_with_status(id, TimerStatus::Running)?;
        let remaining = timer.remaining_at(now);
        timer.status = TimerStatus::Paused;
        timer.remaining_at_pause = Some(remaining);
        timer.ends_at = None;
        Some(timer.clone())
    }

    /// Recompute the deadline from the paused snapshot and go back to
    /// running. No-op unless the timer is paused.
    pub fn resume(&mut self, id: u64, now: DateTime<Utc>) -> Option<Timer> {
        let timer = self.find_with_status(id, TimerStatus::Paused)?;
        let remaining = timer.remaining_at_pause.take().unwrap_or(0);
        timer.status = TimerStatus::Running;
        timer.ends_at = Some(now + Duration::seconds(remaining as i64));
        Some(timer.clone())
    }

    /// Manual stop of a running or paused timer. Terminal; never triggers
    /// a notification. No-op for unknown ids or already-terminal timers.
    pub fn stop(&mut self, id: u64, now: DateTime<Utc>) -> Option<Timer> {
        let timer = self
            .timers
            .iter_mut()
            .find(|timer| timer.id == id && timer.status.is_active())?;
        timer.status = TimerStatus::Stopped;
        timer.ends_at = Some(now);
        timer.remaining_at_pause = None;
        let snapshot = timer.clone();
        self.trim_terminal();
        Some(snapshot)
    }

    /// Discard the record under `id` and put a logically new running timer
    /// in its place, reusing the id so the existing floating surface keeps
    /// working. No-op if the id is unknown.
    pub fn restart_in_place(
        &mut self,
        id: u64,
        parsed: &ParsedInput,
        now: DateTime<Utc>,
    ) -> Option<Timer> {
        let index = self.timers.iter().position(|timer| timer.id == id)?;
        self.timers.remove(index);
        let timer = Self::build_running(id, parsed, now);
        self.timers.push(timer.clone());
        Some(timer)
    }

    /// Permanently remove a terminal timer. No-op while running or paused.
    pub fn clear(&mut self, id: u64) -> Option<Timer> {
        let index = self
            .timers
            .iter()
            .position(|timer| timer.id == id && timer.status.is_terminal())?;
        Some(self.timers.remove(index))
    }

    /// Snapshots for display: active timers first in creation order, then
    /// terminal history by most-recently-created id.
    pub fn list(&self) -> Vec<Timer> {
        let mut active: Vec<Timer> = self
            .timers
            .iter()
            .filter(|timer| timer.status.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|timer| timer.id);
        let mut terminal: Vec<Timer> = self
            .timers
            .iter()
            .filter(|timer| timer.status.is_terminal())
            .cloned()
            .collect();
        terminal.sort_by(|a, b| b.id.cmp(&a.id));
        active.extend(terminal);
        active
    }

    /// One scheduling pass over every running timer.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        for timer in &mut self.timers {
            if timer.status != TimerStatus::Running {
                continue;
            }
            let remaining = timer.remaining_at(now);
            if remaining > 0 {
                outcome.ticks.push((timer.id, remaining));
            } else {
                timer.status = TimerStatus::Completed;
                outcome.completed.push(timer.clone());
            }
        }
        if !outcome.completed.is_empty() {
            self.trim_terminal();
        }
        outcome
    }

    /// Remaining seconds of the running timer due soonest, for the tray.
    pub fn next_due_remaining(&self, now: DateTime<Utc>) -> Option<u64> {
        self.timers
            .iter()
            .filter(|timer| timer.status == TimerStatus::Running)
            .map(|timer| timer.remaining_at(now))
            .min()
    }

    /// Terminal snapshots for persistence, newest first, capped.
    pub fn terminal_history(&self) -> Vec<Timer> {
        let mut terminal: Vec<Timer> = self
            .timers
            .iter()
            .filter(|timer| timer.status.is_terminal())
            .cloned()
            .collect();
        terminal.sort_by(|a, b| b.id.cmp(&a.id));
        terminal.truncate(HISTORY_CAP);
        terminal
    }

    fn find_with_status(&mut self, id: u64, status: TimerStatus) -> Option<&mut Timer> {
        self.timers
            .iter_mut()
            .find(|timer| timer.id == id && timer.status == status)
    }

    fn build_running(id: u64, parsed: &ParsedInput, now: DateTime<Utc>) -> Timer {
        let seconds = parsed.seconds();
        Timer {
            id,
            label: parsed.label().to_string(),
            duration_seconds: seconds,
            status: TimerStatus::Running,
            started_at: now,
            ends_at: Some(now + Duration::seconds(seconds as i64)),
            remaining_at_pause: None,
        }
    }

    /// Drop the oldest terminal records beyond the history cap.
    fn trim_terminal(&mut self) {
        let mut terminal_ids: Vec<u64> = self
            .timers
            .iter()
            .filter(|timer| timer.status.is_terminal())
            .map(|timer| timer.id)
            .collect();
        if terminal_ids.len() <= HISTORY_CAP {
            return;
        }
        terminal_ids.sort_unstable_by(|a, b| b.cmp(a));
        let cutoff = terminal_ids[HISTORY_CAP - 1];
        self.timers
            .retain(|timer| timer.status.is_active() || timer.id >= cutoff);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid epoch")
    }

    fn after(seconds: i64) -> DateTime<Utc> {
        epoch() + Duration::seconds(seconds)
    }

    fn relative(seconds: u64, label: &str) -> ParsedInput {
        ParsedInput::Relative { seconds, label: label.to_string() }
    }

    #[test]
    fn start_assigns_monotonic_ids() {
        let mut registry = Registry::new();
        let first = registry.start(&relative(60, ""), epoch());
        let second = registry.start(&relative(60, ""), epoch());
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, TimerStatus::Running);
        assert_eq!(first.ends_at, Some(after(60)));
    }

    #[test]
    fn pause_snapshots_remaining_seconds() {
        let mut registry = Registry::new();
        let id = registry.start(&relative(300, "Focus"), epoch()).id;
        let paused = registry.pause(id, after(60)).expect("pauses");
        assert_eq!(paused.status, TimerStatus::Paused);
        assert_eq!(paused.remaining_at_pause, Some(240));
        assert_eq!(paused.ends_at, None);
    }

    #[test]
    fn pause_is_idempotent() {
        let mut registry = Registry::new();
        let id = registry.start(&relative(300, ""), epoch()).id;
        registry.pause(id, after(60)).expect("pauses");
        assert!(registry.pause(id, after(120)).is_none());
        let snapshot = registry.list().remove(0);
        assert_eq!(snapshot.remaining_at_pause, Some(240));
    }

    #[test]
    fn resume_round_trips_the_countdown() {
        let mut registry = Registry::new();
        let id = registry.start(&relative(300, ""), epoch()).id;
        registry.pause(id, after(60)).expect("pauses");
        let resumed = registry.resume(id, after(500)).expect("resumes");
        assert_eq!(resumed.status, TimerStatus::Running);
        assert_eq!(resumed.remaining_at(after(500)), 240);
        assert_eq!(resumed.ends_at, Some(after(740)));
        assert_eq!(resumed.remaining_at_pause, None);
    }

    #[test]
    fn resume_requires_paused() {
        let mut registry = Registry::new();
        let id = registry.start(&relative(300, ""), epoch()).id;
        assert!(registry.resume(id, after(10)).is_none());
        assert!(registry.resume(999, after(10)).is_none());
    }

    #[test]
    fn stop_works_from_running_and_paused_only() {
        let mut registry = Registry::new();
        let first = registry.start(&relative(300, ""), epoch()).id;
        let second = registry.start(&relative(300, ""), epoch()).id;
        registry.pause(second, after(10)).expect("pauses");

        let stopped = registry.stop(first, after(20)).expect("stops running");
        assert_eq!(stopped.status, TimerStatus::Stopped);
        assert_eq!(stopped.ends_at, Some(after(20)));
        registry.stop(second, after(20)).expect("stops paused");

        // Already terminal: silent no-op.
        assert!(registry.stop(first, after(30)).is_none());
        assert!(registry.stop(999, after(30)).is_none());
    }

    #[test]
    fn tick_emits_remaining_then_completes_once() {
        let mut registry = Registry::new();
        let id = registry.start(&relative(2, "tea"), epoch()).id;

        let outcome = registry.tick(after(1));
        assert_eq!(outcome.ticks, vec![(id, 1)]);
        assert!(outcome.completed.is_empty());

        let outcome = registry.tick(after(2));
        assert!(outcome.ticks.is_empty());
        assert_eq!(outcome.completed.len(), 1);
        assert_eq!(outcome.completed[0].status, TimerStatus::Completed);

        // Completed timers no longer take part in scheduling.
        let outcome = registry.tick(after(3));
        assert!(outcome.ticks.is_empty());
        assert!(outcome.completed.is_empty());
    }

    #[test]
    fn tick_ignores_paused_timers() {
        let mut registry = Registry::new();
        let id = registry.start(&relative(10, ""), epoch()).id;
        registry.pause(id, after(1)).expect("pauses");
        let outcome = registry.tick(after(5));
        assert!(outcome.ticks.is_empty());
        assert!(outcome.completed.is_empty());
    }

    #[test]
    fn overdue_timers_complete_on_the_next_pass() {
        let mut registry = Registry::new();
        registry.start(&relative(5, ""), epoch());
        // Deadline long gone, e.g. the machine slept through it.
        let outcome = registry.tick(after(1000));
        assert_eq!(outcome.completed.len(), 1);
    }

    #[test]
    fn terminal_history_is_capped_and_newest_first() {
        let mut registry = Registry::new();
        for _ in 0..25 {
            let id = registry.start(&relative(60, ""), epoch()).id;
            registry.stop(id, after(1)).expect("stops");
        }
        let history = registry.terminal_history();
        assert_eq!(history.len(), 20);
        assert_eq!(history[0].id, 25);
        assert_eq!(history[19].id, 6);
        // The registry itself dropped the trimmed records too.
        assert_eq!(registry.list().len(), 20);
    }

    #[test]
    fn list_orders_active_first_then_recent_terminal() {
        let mut registry = Registry::new();
        let first = registry.start(&relative(60, "a"), epoch()).id;
        let second = registry.start(&relative(60, "b"), epoch()).id;
        let third = registry.start(&relative(60, "c"), epoch()).id;
        registry.stop(first, after(1)).expect("stops");
        registry.stop(third, after(2)).expect("stops");
        registry.pause(second, after(3)).expect("pauses");
        let fourth = registry.start(&relative(60, "d"), epoch()).id;

        let ids: Vec<u64> = registry.list().iter().map(|timer| timer.id).collect();
        assert_eq!(ids, vec![second, fourth, third, first]);
    }

    #[test]
    fn restart_in_place_reuses_the_id() {
        let mut registry = Registry::new();
        let id = registry.start(&relative(60, "old"), epoch()).id;
        registry.stop(id, after(5)).expect("stops");

        let restarted = registry
            .restart_in_place(id, &relative(300, "fresh"), after(10))
            .expect("restarts");
        assert_eq!(restarted.id, id);
        assert_eq!(restarted.status, TimerStatus::Running);
        assert_eq!(restarted.remaining_at(after(10)), 300);
        assert_eq!(restarted.label, "fresh");

        // The old record is gone, not shadowed.
        let snapshots = registry.list();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].duration_seconds, 300);

        // Fresh ids continue past the reused one.
        let next = registry.start(&relative(60, ""), after(10));
        assert_eq!(next.id, id + 1);
    }

    #[test]
    fn restart_of_unknown_id_is_a_noop() {
        let mut registry = Registry::new();
        assert!(registry.restart_in_place(42, &relative(300, ""), epoch()).is_none());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn clear_requires_terminal_status() {
        let mut registry = Registry::new();
        let id = registry.start(&relative(60, ""), epoch()).id;
        assert!(registry.clear(id).is_none());
        registry.stop(id, after(1)).expect("stops");
        let cleared = registry.clear(id).expect("clears");
        assert_eq!(cleared.id, id);
        assert!(registry.list().is_empty());
        assert!(registry.clear(id).is_none());
    }

    #[test]
    fn with_history_seeds_the_id_counter() {
        let mut stopped = Registry::new();
        let id = stopped.start(&relative(60, ""), epoch()).id;
        stopped.stop(id, after(1)).expect("stops");
        let mut history = stopped.terminal_history();
        history[0].id = 7;

        let mut registry = Registry::with_history(history);
        let fresh = registry.start(&relative(60, ""), epoch());
        assert_eq!(fresh.id, 8);
    }

    #[test]
    fn with_history_drops_non_terminal_records() {
        let mut source = Registry::new();
        source.start(&relative(60, ""), epoch());
        let registry = Registry::with_history(source.list());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn next_due_remaining_picks_the_soonest_running_timer() {
        let mut registry = Registry::new();
        registry.start(&relative(300, ""), epoch());
        let soon = registry.start(&relative(30, ""), epoch()).id;
        registry.pause(soon, after(1)).expect("pauses");
        assert_eq!(registry.next_due_remaining(after(10)), Some(290));
        registry.resume(soon, after(10)).expect("resumes");
        assert_eq!(registry.next_due_remaining(after(10)), Some(29));
        assert_eq!(Registry::new().next_due_remaining(epoch()), None);
    }
}
