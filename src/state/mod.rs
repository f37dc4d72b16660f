//! State management module
//!
//! The authoritative timer registry, the timer/settings data model, and the
//! shared application state the HTTP surface and background tasks hang off.

pub mod app_state;
pub mod events;
pub mod registry;
pub mod settings;
pub mod timer;

// Re-export main types
pub use app_state::{AppState, CommandError};
pub use events::TimerEvent;
pub use registry::{Registry, TickOutcome};
pub use settings::{Preset, Settings};
pub use timer::{Timer, TimerStatus};
