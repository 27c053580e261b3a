//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `dashboard.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - MqttConfig: Broker host/port and the two sensor topics.
//!     - StoreConfig: Where the sample file lives and how many samples it keeps.
//!     - DashboardSettings: Bind address, page refresh cadence, view buffer size.
//!     - LoggingConfig: Default log level (RUST_LOG still wins).
//!
//! ==============================================================================

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    pub topic_distance: String,
    pub topic_bme: String,
    pub keep_alive_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub max_samples: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub bind: String,
    pub refresh_minutes: u64,
    pub buffer_len: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: "broker.hivemq.com".to_string(),
            port: 1883,
            topic_distance: "esp32/sensor/distance".to_string(),
            topic_bme: "esp32/sensor/BME280".to_string(),
            keep_alive_seconds: 60,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("data.json"),
            max_samples: crate::store::DEFAULT_FILE_CAP,
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8501".to_string(),
            refresh_minutes: 30,
            buffer_len: crate::store::DEFAULT_BUFFER_CAP,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl DashboardConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load with default fallback
    ///
    /// runs before logging is initialised, so it reports what happened
    /// instead of logging it.
    pub fn load_or_default() -> (Self, ConfigOrigin) {
        let paths = [
            PathBuf::from("config").join("dashboard.toml"),
            PathBuf::from("..").join("config").join("dashboard.toml"),
        ];

        let mut failures = Vec::new();
        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => return (config, ConfigOrigin::File(path.clone())),
                    Err(e) => failures.push(format!("{:#}", e)),
                }
            }
        }

        (Self::default(), ConfigOrigin::Defaults(failures))
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        tracing::info!("┌─────────────────────────────────────────┐");
        tracing::info!("│         DASHBOARD CONFIGURATION         │");
        tracing::info!("├─────────────────────────────────────────┤");
        tracing::info!("│ Broker: {}:{}", self.mqtt.broker, self.mqtt.port);
        tracing::info!("│ Distance topic: {}", self.mqtt.topic_distance);
        tracing::info!("│ BME topic: {}", self.mqtt.topic_bme);
        tracing::info!("│ Sample file: {} (max {})", self.store.path.display(), self.store.max_samples);
        tracing::info!("│ Refresh: every {} min", self.dashboard.refresh_minutes);
        tracing::info!("└─────────────────────────────────────────┘");
    }
}

/// where the active configuration came from
#[derive(Debug, Clone)]
pub enum ConfigOrigin {
    File(PathBuf),
    /// no usable file; holds the load errors of files that existed but failed
    Defaults(Vec<String>),
}

impl ConfigOrigin {
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => tracing::info!("[CONFIG] Loaded from {}", path.display()),
            ConfigOrigin::Defaults(failures) => {
                for failure in failures {
                    tracing::warn!("[CONFIG] {}", failure);
                }
                tracing::warn!("[CONFIG] No usable config file found - using defaults");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_file() {
        let config = DashboardConfig::parse(
            r#"
[mqtt]
broker = "mqtt.local"
port = 1884
topic_distance = "home/distance"
topic_bme = "home/bme"

[store]
path = "/var/lib/sensor-dash/data.json"
max_samples = 200

[dashboard]
bind = "127.0.0.1:9000"
refresh_minutes = 5
buffer_len = 20

[logging]
level = "debug"
"#,
        )
        .unwrap();

        assert_eq!(config.mqtt.broker, "mqtt.local");
        assert_eq!(config.mqtt.port, 1884);
        assert_eq!(config.mqtt.keep_alive_seconds, 60);
        assert_eq!(config.mqtt.topic_bme, "home/bme");
        assert_eq!(config.store.max_samples, 200);
        assert_eq!(config.dashboard.refresh_minutes, 5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = DashboardConfig::parse("[mqtt]\nbroker = \"10.0.0.2\"\n").unwrap();
        assert_eq!(config.mqtt.broker, "10.0.0.2");
        assert_eq!(config.mqtt.topic_bme, "esp32/sensor/BME280");
        assert_eq!(config.store.max_samples, 100);
        assert_eq!(config.dashboard.buffer_len, 50);
        assert_eq!(config.dashboard.refresh_minutes, 30);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(DashboardConfig::parse("[mqtt\nbroker=").is_err());
        assert!(DashboardConfig::load("/nonexistent/dashboard.toml").is_err());
    }
}
