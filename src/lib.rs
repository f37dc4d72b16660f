//! Ticktray - a state-managed timer daemon
//!
//! Parses free-text time inputs ("Focus 25m", "design logo 20min", "@5pm"),
//! tracks any number of concurrent countdown timers with pause/resume/
//! restart semantics, and broadcasts their lifecycle to presentation
//! observers over an HTTP command surface and event stream.

pub mod api;
pub mod config;
pub mod parse;
pub mod services;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::AppState;
pub use utils::signals::shutdown_signal;
