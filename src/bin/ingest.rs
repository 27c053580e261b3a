//! one-shot ingestion job
//!
//! fetches a single bme280 message, appends it to the sample file and exits.
//! a missing or garbled message is logged and skipped (exit 0); only a failed
//! write of the sample file exits non-zero.

use anyhow::{Context, Result};
use sensor_dash::broker::MqttFetcher;
use sensor_dash::config::DashboardConfig;
use sensor_dash::ingest::{self, IngestOutcome};
use sensor_dash::store::JsonFileStore;

fn main() -> Result<()> {
    let (config, origin) = DashboardConfig::load_or_default();
    sensor_dash::init_logging(&config.logging.level);
    origin.log();

    let fetcher = MqttFetcher::from_config(&config.mqtt);
    let mut store = JsonFileStore::new(&config.store.path, config.store.max_samples);

    tracing::info!(
        "[INGEST] waiting for one message on {} from {}",
        config.mqtt.topic_bme,
        fetcher.host()
    );

    let outcome = ingest::run_once(&fetcher, &config.mqtt.topic_bme, &mut store)
        .with_context(|| format!("failed to update {}", store.path().display()))?;

    match outcome {
        IngestOutcome::Stored(sample) => {
            tracing::info!("[INGEST] ✓ stored sample at {} in {}", sample.timestamp, store.path().display());
        }
        IngestOutcome::Skipped(_) => {
            tracing::info!("[INGEST] no valid data received, skipping");
        }
    }

    Ok(())
}
