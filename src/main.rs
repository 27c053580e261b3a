//! ==============================================================================
//! main.rs - dashboard server entry point
//! ==============================================================================
//!
//! purpose:
//!     serves the sensor dashboard over http.
//!
//! responsibilities:
//!     - load config/dashboard.toml (broker host, topics, sample file)
//!     - build the shared AppState (file store + live distance buffer)
//!     - serve the page and the json api until killed
//!
//! the server never writes the sample file. run the `ingest` binary from a
//! scheduler to keep it fresh, e.g. every 30 minutes:
//!
//!     */30 * * * *  cd /opt/sensor-dash && ./ingest
//!
//! ==============================================================================

use anyhow::{Context, Result};
use sensor_dash::broker::MqttFetcher;
use sensor_dash::config::DashboardConfig;
use sensor_dash::dashboard::{self, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // step 1: load configuration, then bring up logging at its level
    let (config, origin) = DashboardConfig::load_or_default();
    sensor_dash::init_logging(&config.logging.level);
    origin.log();

    config.print_summary();

    // step 2: shared state
    let source = Arc::new(MqttFetcher::from_config(&config.mqtt));
    let state = AppState::new(&config, source);

    // step 3: serve
    let listener = tokio::net::TcpListener::bind(&config.dashboard.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.dashboard.bind))?;
    tracing::info!("[STARTUP] ✓ Dashboard live at http://{}", config.dashboard.bind);

    axum::serve(listener, dashboard::router(state)).await?;
    Ok(())
}
