//! Segmented Progress - a pausable, auto-advancing progress bar
//!
//! This is the main entry point for the segmented-progress server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use segmented_progress::{
    api::create_router,
    config::Config,
    progress::ProgressController,
    state::AppState,
    tasks::{redraw_task, ElapsedTracer, REDRAW_CADENCE},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("segmented_progress={},tower_http=info", config.log_level()))
        .init();

    info!("Starting segmented-progress server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, duration={}ms, tick={}ms",
          config.host, config.port, config.duration, config.tick_interval);

    // Build the progress bar; bad appearance values only fall back to defaults
    let mut controller = ProgressController::with_tick_interval(config.tick_interval());
    if let Err(e) = config.apply_appearance(&controller) {
        warn!("Invalid appearance setting: {}", e);
    }
    controller.set_listener(Arc::new(ElapsedTracer));
    let frames = controller.subscribe();

    match controller.enable_auto_progress(config.duration) {
        Ok(()) if config.autostart => {
            controller.resume()?;
            info!("Auto progress started");
        }
        Ok(()) => info!("Auto progress ready, POST /resume to start"),
        Err(e) => warn!("Auto progress not configured: {}, POST /auto-progress to configure", e),
    }

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), controller));

    // Start the redraw background task
    tokio::spawn(redraw_task(frames, config.render_columns, REDRAW_CADENCE));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /pause         - Pause auto progress");
    info!("  POST /resume        - Resume auto progress");
    info!("  POST /cancel        - Cancel auto progress");
    info!("  POST /reset         - Reset bar and restart countdown");
    info!("  POST /divider       - Add a divider at the current position");
    info!("  POST /progress      - Set progress by hand {{\"value\": 0.5}}");
    info!("  POST /auto-progress - Configure duration {{\"duration_millis\": 5000}}");
    info!("  GET  /status        - Check current progress");
    info!("  GET  /health        - Health check");

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
