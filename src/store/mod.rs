//! Persistence module
//!
//! Flat JSON documents in the data directory: `settings.json` for policy
//! flags and presets, `timers.json` for terminal timer history. Reads
//! degrade to defaults on any failure; nothing here is ever fatal.

pub mod history;
pub mod settings;
