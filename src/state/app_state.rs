//! Main application state management

use std::{
    path::PathBuf,
    sync::{Mutex, MutexGuard},
    time::Instant,
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::{
    parse::parse_time_input,
    services::send_completion_notification,
    store,
    utils::format_remaining,
};

use super::{Preset, Registry, Settings, Timer, TimerEvent};

/// Failures surfaced by timer commands.
///
/// `InvalidInput` is the only user-visible error the core produces; unknown
/// or status-incompatible targets are silent no-ops, not errors.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid time format")]
    InvalidInput,
    #[error("{0}")]
    Internal(String),
}

/// Shared application state: the authoritative timer registry, the policy
/// settings, and the channels observers listen on.
#[derive(Debug)]
pub struct AppState {
    /// Single-writer timer collection; every mutation goes through here
    registry: Mutex<Registry>,
    /// Policy flags and preset catalog, hot-reloadable over the API
    settings: Mutex<Settings>,
    /// Where settings.json and timers.json live
    data_dir: PathBuf,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last command tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Broadcast stream consumed by presentation observers
    pub events_tx: broadcast::Sender<TimerEvent>,
    /// Keep one receiver alive to prevent channel closure
    _events_rx: broadcast::Receiver<TimerEvent>,
    /// Tray-title surface, recomputed on every state change and tick
    tray_title_tx: watch::Sender<String>,
    _tray_title_rx: watch::Receiver<String>,
}

impl AppState {
    /// Create the AppState from loaded settings and terminal history.
    pub fn new(
        port: u16,
        host: String,
        data_dir: PathBuf,
        settings: Settings,
        history: Vec<Timer>,
    ) -> Self {
        let (events_tx, events_rx) = broadcast::channel(256);
        let (tray_title_tx, tray_title_rx) = watch::channel(String::new());

        Self {
            registry: Mutex::new(Registry::with_history(history)),
            settings: Mutex::new(settings),
            data_dir,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            events_tx,
            _events_rx: events_rx,
            tray_title_tx,
            _tray_title_rx: tray_title_rx,
        }
    }

    /// Parse free text and start a new countdown.
    pub fn start_timer(&self, input: &str) -> Result<Timer, CommandError> {
        let parsed = parse_time_input(input).ok_or(CommandError::InvalidInput)?;
        let timer = self.lock_registry()?.start(&parsed, Utc::now());
        info!(
            "Started timer {} for {}s (label: {:?})",
            timer.id, timer.duration_seconds, timer.label
        );

        self.record_action("start");
        self.broadcast(TimerEvent::Started { timer: timer.clone() });
        self.refresh_tray_title();
        Ok(timer)
    }

    /// Pause a running timer. Unknown or non-running ids are ignored.
    pub fn pause_timer(&self, id: u64) -> Result<Option<Timer>, CommandError> {
        let paused = self.lock_registry()?.pause(id, Utc::now());
        match &paused {
            Some(timer) => {
                info!(
                    "Paused timer {} with {}s remaining",
                    id,
                    timer.remaining_at_pause.unwrap_or(0)
                );
                self.record_action("pause");
                self.broadcast(TimerEvent::Paused { id });
                self.refresh_tray_title();
            }
            None => debug!("Ignoring pause for unknown or non-running timer {}", id),
        }
        Ok(paused)
    }

    /// Resume a paused timer. Unknown or non-paused ids are ignored.
    pub fn resume_timer(&self, id: u64) -> Result<Option<Timer>, CommandError> {
        let resumed = self.lock_registry()?.resume(id, Utc::now());
        match &resumed {
            Some(_) => {
                info!("Resumed timer {}", id);
                self.record_action("resume");
                self.broadcast(TimerEvent::Resumed { id });
                self.refresh_tray_title();
            }
            None => debug!("Ignoring resume for unknown or non-paused timer {}", id),
        }
        Ok(resumed)
    }

    /// Stop a running or paused timer. Deliberately silent: no sound, no
    /// notification, unlike natural completion.
    pub fn stop_timer(&self, id: u64) -> Result<Option<Timer>, CommandError> {
        let stopped = self.lock_registry()?.stop(id, Utc::now());
        match &stopped {
            Some(_) => {
                info!("Stopped timer {}", id);
                self.record_action("stop");
                self.broadcast(TimerEvent::Stopped { id });
                self.refresh_tray_title();
                self.persist_history();
            }
            None => debug!("Ignoring stop for unknown or terminal timer {}", id),
        }
        Ok(stopped)
    }

    /// Replace the record under `id` with a fresh running timer parsed from
    /// `input`, keeping the id. A distinct event tells the window layer to
    /// reuse the existing floating surface instead of spawning one.
    pub fn restart_timer(&self, id: u64, input: &str) -> Result<Option<Timer>, CommandError> {
        let parsed = parse_time_input(input).ok_or(CommandError::InvalidInput)?;
        let restarted = self.lock_registry()?.restart_in_place(id, &parsed, Utc::now());
        match &restarted {
            Some(timer) => {
                info!("Restarted timer {} for {}s", id, timer.duration_seconds);
                self.record_action("restart");
                self.broadcast(TimerEvent::Restarted { timer: timer.clone() });
                self.refresh_tray_title();
                self.persist_history();
            }
            None => debug!("Ignoring restart for unknown timer {}", id),
        }
        Ok(restarted)
    }

    /// Remove a terminal timer from the registry and history.
    pub fn clear_timer(&self, id: u64) -> Result<Option<Timer>, CommandError> {
        let cleared = self.lock_registry()?.clear(id);
        match &cleared {
            Some(_) => {
                info!("Cleared timer {}", id);
                self.record_action("clear");
                self.broadcast(TimerEvent::Cleared { id });
                self.persist_history();
            }
            None => debug!("Ignoring clear for unknown or active timer {}", id),
        }
        Ok(cleared)
    }

    /// Read-only snapshots: active timers first, then recent history.
    pub fn list_timers(&self) -> Result<Vec<Timer>, CommandError> {
        Ok(self.lock_registry()?.list())
    }

    /// One scheduling pass, called once per second by the tick driver.
    /// Broadcasts ticks and completions, then fires the notification sink
    /// and the history write for any timer that reached its deadline.
    pub fn tick(&self) {
        let now = Utc::now();
        let outcome = match self.lock_registry() {
            Ok(mut registry) => registry.tick(now),
            Err(e) => {
                warn!("Skipping tick: {}", e);
                return;
            }
        };

        for (id, remaining) in &outcome.ticks {
            self.broadcast(TimerEvent::Tick { id: *id, remaining: *remaining });
        }

        if !outcome.completed.is_empty() {
            let settings = self.settings_snapshot();
            for timer in outcome.completed {
                info!("Timer {} completed (label: {:?})", timer.id, timer.label);
                self.broadcast(TimerEvent::Completed {
                    id: timer.id,
                    show_animation: settings.show_completion_animation,
                });
                let settings = settings.clone();
                tokio::spawn(async move {
                    send_completion_notification(&timer, &settings).await;
                });
            }
            self.persist_history();
        }

        self.refresh_tray_title_at(now);
    }

    /// Current settings snapshot.
    pub fn get_settings(&self) -> Result<Settings, CommandError> {
        self.lock_settings().map(|settings| settings.clone())
    }

    /// Replace the settings document and persist it.
    pub fn update_settings(&self, mut new_settings: Settings) -> Result<Settings, CommandError> {
        new_settings.normalize();
        {
            let mut settings = self.lock_settings()?;
            *settings = new_settings.clone();
        }
        info!("Settings updated");
        self.persist_settings(new_settings.clone());
        Ok(new_settings)
    }

    /// Current preset catalog.
    pub fn get_presets(&self) -> Result<Vec<Preset>, CommandError> {
        self.lock_settings().map(|settings| settings.custom_presets.clone())
    }

    /// Replace the preset catalog and persist the settings document.
    pub fn update_presets(&self, presets: Vec<Preset>) -> Result<Vec<Preset>, CommandError> {
        let snapshot = {
            let mut settings = self.lock_settings()?;
            settings.custom_presets = presets.clone();
            settings.clone()
        };
        info!("Preset catalog updated ({} presets)", presets.len());
        self.persist_settings(snapshot);
        Ok(presets)
    }

    /// Subscribe to the observer event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events_tx.subscribe()
    }

    /// Current tray title: the soonest-due running countdown, or empty.
    pub fn tray_title(&self) -> String {
        self.tray_title_tx.borrow().clone()
    }

    /// Calculate server uptime as a formatted string.
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last command information.
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn broadcast(&self, event: TimerEvent) {
        if let Err(e) = self.events_tx.send(event) {
            warn!("Failed to broadcast timer event: {}", e);
        }
    }

    fn refresh_tray_title(&self) {
        self.refresh_tray_title_at(Utc::now());
    }

    fn refresh_tray_title_at(&self, now: DateTime<Utc>) {
        let title = match self.lock_registry() {
            Ok(registry) => registry
                .next_due_remaining(now)
                .map(format_remaining)
                .unwrap_or_default(),
            Err(e) => {
                warn!("Skipping tray title refresh: {}", e);
                return;
            }
        };
        if let Err(e) = self.tray_title_tx.send(title) {
            warn!("Failed to update tray title: {}", e);
        }
    }

    /// Best-effort history write; the triggering events are already out.
    fn persist_history(&self) {
        let snapshots = match self.lock_registry() {
            Ok(registry) => registry.terminal_history(),
            Err(e) => {
                warn!("Skipping history save: {}", e);
                return;
            }
        };
        let path = self.data_dir.join(store::history::HISTORY_FILE);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store::history::save(&path, &snapshots) {
                warn!("Failed to save timer history: {:#}", e);
            }
        });
    }

    /// Best-effort settings write.
    fn persist_settings(&self, snapshot: Settings) {
        let path = self.data_dir.join(store::settings::SETTINGS_FILE);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store::settings::save(&path, &snapshot) {
                warn!("Failed to save settings: {:#}", e);
            }
        });
    }

    fn settings_snapshot(&self) -> Settings {
        self.lock_settings()
            .map(|settings| settings.clone())
            .unwrap_or_default()
    }

    fn lock_registry(&self) -> Result<MutexGuard<'_, Registry>, CommandError> {
        self.registry
            .lock()
            .map_err(|e| CommandError::Internal(format!("Failed to lock registry: {}", e)))
    }

    fn lock_settings(&self) -> Result<MutexGuard<'_, Settings>, CommandError> {
        self.settings
            .lock()
            .map_err(|e| CommandError::Internal(format!("Failed to lock settings: {}", e)))
    }
}
