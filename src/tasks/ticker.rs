//! Central countdown tick driver

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::state::AppState;

/// Background task that advances every running timer once per second.
///
/// A single driver iterates the whole registry instead of spawning one
/// task per timer, bounding resource use no matter how many countdowns
/// run at once. Deadlines are wall-clock timestamps, so a pass after a
/// long suspend completes overdue timers on the next tick; missed ticks
/// are skipped rather than replayed in a burst.
pub async fn tick_driver_task(state: Arc<AppState>) {
    info!("Starting tick driver task");

    let mut interval = interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        state.tick();
    }
}
