//! Pomodoro Timer - A state-managed HTTP server running one shared Pomodoro timer
//!
//! This is the main entry point for the pomodoro-timer application.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use pomodoro_timer::{
    config::Config,
    state::{AppState, TimerStore},
    api::create_router,
    services::{AlarmPlayer, CommandAlarm, SilentAlarm},
    storage::FileStorage,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, alarm={}",
          config.host, config.port,
          if config.silent { "silent" } else { config.alarm_command.as_str() });

    let state_dir = config.state_dir();
    let storage = FileStorage::open(&state_dir)
        .with_context(|| format!("Cannot use state directory {}", state_dir.display()))?;
    info!("State directory: {}", storage.dir().display());

    let alarm: Arc<dyn AlarmPlayer> = if config.silent {
        Arc::new(SilentAlarm)
    } else {
        Arc::new(CommandAlarm::new(config.alarm_command.clone()))
    };

    // Load and reconcile the timer, then resume ticking if it was running
    let store = TimerStore::initialize(Arc::new(storage), alarm);
    let state = Arc::new(AppState::new(store, config.port, config.host.clone()));
    state.sync_driver();

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer            - Current timer and server status");
    info!("  POST /timer/toggle     - Start or pause the timer");
    info!("  POST /timer/reset      - Refill the current interval");
    info!("  POST /timer/mode/:mode - Switch to focus, short-break or long-break");
    info!("  GET  /settings         - Current settings");
    info!("  PUT  /settings         - Replace settings");
    info!("  GET  /health           - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            match signal {
                Ok(signal) => info!("Shutdown signal {} received", signal),
                Err(e) => tracing::error!("Signal handling failed: {}", e),
            }
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
