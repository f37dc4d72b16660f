//! Desktop notification delivery for completed timers

use notify_rust::{Hint, Notification};
use tracing::{debug, info, warn};

use crate::state::{Settings, Timer};

/// Deliver the completion notification for a naturally finished timer.
///
/// Policy flags come from the settings snapshot taken at the moment of
/// firing: `show_notification` gates the whole thing, `play_sound` picks
/// between the configured sound name and an explicit suppression hint.
/// Observers handle volume and animation themselves; the daemon only
/// carries those flags in settings and events.
pub async fn send_completion_notification(timer: &Timer, settings: &Settings) {
    if !settings.show_notification {
        debug!("Notifications disabled, skipping for timer {}", timer.id);
        return;
    }

    let body = if timer.label.is_empty() {
        "Your timer has finished".to_string()
    } else {
        format!("Timer for #{} has finished", timer.label)
    };

    let mut notification = Notification::new();
    notification
        .appname("ticktray")
        .summary("Timer Complete!")
        .body(&body);
    if settings.play_sound {
        notification.sound_name(&settings.notification_sound);
    } else {
        notification.hint(Hint::SuppressSound(true));
    }

    let id = timer.id;
    // Notification daemons talk over the session bus; keep that off the
    // async workers.
    let result = tokio::task::spawn_blocking(move || notification.show()).await;
    match result {
        Ok(Ok(_)) => info!("Delivered completion notification for timer {}", id),
        Ok(Err(e)) => warn!("Failed to show notification for timer {}: {}", id, e),
        Err(e) => warn!("Notification task failed for timer {}: {}", id, e),
    }
}
