//! Background tasks module
//!
//! Tasks that run alongside the HTTP surface: the central tick driver that
//! advances every running countdown.

pub mod ticker;

// Re-export main functions
pub use ticker::tick_driver_task;
