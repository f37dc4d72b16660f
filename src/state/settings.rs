//! User settings and the preset catalog

use serde::{Deserialize, Serialize};

/// A pre-filled input string the user can start without retyping.
/// `time` is raw parser input; `display` is the menu caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub time: String,
    pub display: String,
}

impl Preset {
    fn new(name: &str, time: &str, display: &str) -> Self {
        Self {
            name: name.to_string(),
            time: time.to_string(),
            display: display.to_string(),
        }
    }
}

/// Notification policy flags and the preset catalog.
///
/// Persisted as a flat JSON document; missing fields fall back to the
/// defaults field by field, so partial settings files from older versions
/// keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub notification_sound: String,
    pub show_notification: bool,
    pub play_sound: bool,
    /// 0-100; values above 100 clamp on load.
    pub volume: u8,
    pub show_completion_animation: bool,
    pub custom_presets: Vec<Preset>,
}

impl Settings {
    /// Clamp out-of-range values after deserialization.
    pub fn normalize(&mut self) {
        if self.volume > 100 {
            self.volume = 100;
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_sound: "Lexie-Orbit".to_string(),
            show_notification: true,
            play_sound: true,
            volume: 50,
            show_completion_animation: true,
            custom_presets: vec![
                Preset::new("Focus", "Focus 25m", "25 min Focus"),
                Preset::new("Working", "Working 30m", "30 min Working"),
                Preset::new("Meeting", "Meeting 30m", "30 min Meeting"),
                Preset::new("Meeting", "Meeting 1h", "1h Meeting"),
                Preset::new("Admin work", "Admin work 30m", "30 min Admin work"),
                Preset::new("Break", "Break 5m", "5 min Break"),
            ],
        }
    }
}
