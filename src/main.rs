//! Ticktray - a state-managed timer daemon
//!
//! This is the main entry point for the ticktray application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use ticktray::{
    api::create_router,
    config::Config,
    state::AppState,
    store,
    tasks::tick_driver_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("ticktray={},tower_http=info", config.log_level()))
        .init();

    info!("Starting ticktray v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = config.resolve_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        warn!("Failed to create data dir {}: {}", data_dir.display(), e);
    }
    info!(
        "Configuration: host={}, port={}, data dir={}",
        config.host,
        config.port,
        data_dir.display()
    );

    // Load persisted settings and terminal history; both degrade to
    // defaults on any failure.
    let settings = store::settings::load(&data_dir.join(store::settings::SETTINGS_FILE));
    let history = store::history::load(&data_dir.join(store::history::HISTORY_FILE));
    info!(
        "Loaded {} preset(s) and {} historical timer(s)",
        settings.custom_presets.len(),
        history.len()
    );

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        data_dir,
        settings,
        history,
    ));

    // Start the central tick driver
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        tick_driver_task(ticker_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Command surface on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timers             - Start a timer from free text");
    info!("  GET    /timers             - List timer snapshots");
    info!("  POST   /timers/:id/pause   - Pause a running timer");
    info!("  POST   /timers/:id/resume  - Resume a paused timer");
    info!("  POST   /timers/:id/stop    - Stop a timer (no notification)");
    info!("  POST   /timers/:id/restart - Restart in place, reusing the id");
    info!("  DELETE /timers/:id         - Clear a finished timer");
    info!("  GET    /events             - Observer event stream (SSE)");
    info!("  GET    /status             - Counts, tray title, uptime");
    info!("  GET    /settings, /presets - Policy flags and preset catalog");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
