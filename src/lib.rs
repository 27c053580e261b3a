//! ==============================================================================
//! sensor-dash - mqtt sensor dashboard
//! ==============================================================================
//!
//! two processes share this library:
//!
//! ```text
//!     ┌──────────────────┐   fetch-one    ┌──────────────┐
//!     │ ingest (one-shot)│ ◄───────────── │ mqtt broker  │
//!     └────────┬─────────┘                └──────┬───────┘
//!              │ append (cap 100)                │ fetch-one (distance)
//!              ▼                                 │
//!     ┌──────────────────┐  load_recent   ┌──────┴───────┐
//!     │  data/data.json  │ ─────────────► │  dashboard   │
//!     └──────────────────┘                │  (axum)      │
//!                                         └──────────────┘
//! ```
//!
//! the ingestion job is run by an external scheduler; the dashboard only
//! reads the sample file and never writes it.
//!
//! ==============================================================================

pub mod broker;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod ingest;
pub mod parser;
pub mod store;

use tracing_subscriber::EnvFilter;

/// install the fmt subscriber. RUST_LOG overrides the configured level.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
