//! Settings persistence

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::state::Settings;

pub const SETTINGS_FILE: &str = "settings.json";

/// Load settings, falling back to defaults if the file is missing,
/// unreadable, or malformed. Missing fields merge over the defaults.
pub fn load(path: &Path) -> Settings {
    match read(path) {
        Ok(Some(settings)) => settings,
        Ok(None) => Settings::default(),
        Err(e) => {
            warn!("Failed to load settings, using defaults: {:#}", e);
            Settings::default()
        }
    }
}

fn read(path: &Path) -> Result<Option<Settings>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("unable to read settings file {}", path.display()))?;
    let mut settings: Settings = serde_json::from_str(&data)
        .with_context(|| format!("invalid settings file {}", path.display()))?;
    settings.normalize();
    Ok(Some(settings))
}

/// Write the settings document, pretty-printed.
pub fn save(path: &Path, settings: &Settings) -> Result<()> {
    let text = serde_json::to_string_pretty(settings)?;
    fs::write(path, text)
        .with_context(|| format!("unable to write settings file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = load(&dir.path().join(SETTINGS_FILE));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn corrupt_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{not json").expect("writes");
        assert_eq!(load(&path), Settings::default());
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{"volume": 200, "showNotification": false}"#).expect("writes");
        let settings = load(&path);
        assert_eq!(settings.volume, 100);
        assert!(!settings.show_notification);
        assert!(settings.play_sound);
        assert_eq!(settings.custom_presets.len(), 6);
    }

    #[test]
    fn saved_settings_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE);
        let mut settings = Settings::default();
        settings.volume = 85;
        settings.custom_presets.truncate(2);
        save(&path, &settings).expect("saves");
        assert_eq!(load(&path), settings);
    }
}
