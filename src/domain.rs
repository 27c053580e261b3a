//! ==============================================================================
//! domain.rs - sample types and per-sensor presentation rules
//! ==============================================================================
//!
//! purpose:
//!     - BmeSample / DistanceSample: one parsed reading each, as persisted.
//!     - SensorKind: the dashboard pages. each kind knows its unit, readout
//!       format and how to pick its value out of a bme sample.
//!
//! relationships:
//!     - produced by: parser.rs
//!     - used by: store.rs, ingest.rs, dashboard.rs, chart.rs
//!
//! ==============================================================================

use serde::{Deserialize, Serialize};

/// wall-clock format used for every sample timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// one parsed bme280 reading, as persisted in the sample file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BmeSample {
    /// degrees celsius
    pub temperature: f64,
    /// relative humidity (0-100%)
    pub humidity: f64,
    /// hPa
    pub pressure: f64,
    /// local time the message was parsed, "YYYY-MM-DD HH:MM:SS"
    pub timestamp: String,
}

/// one parsed distance reading (cm)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    pub value: f64,
    pub timestamp: String,
}

/// the dashboard pages, one per measured quantity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorKind {
    Distance,
    Temperature,
    Humidity,
    Pressure,
}

impl SensorKind {
    /// menu order in the sidebar
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Distance,
        SensorKind::Humidity,
        SensorKind::Temperature,
        SensorKind::Pressure,
    ];

    /// query-string slug, e.g. `/?sensor=humidity`
    pub fn slug(self) -> &'static str {
        match self {
            SensorKind::Distance => "distance",
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
            SensorKind::Pressure => "pressure",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn title(self) -> &'static str {
        match self {
            SensorKind::Distance => "Distance",
            SensorKind::Temperature => "Temperature",
            SensorKind::Humidity => "Humidity",
            SensorKind::Pressure => "Pressure",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            SensorKind::Distance => "📏",
            SensorKind::Temperature => "🌡️",
            SensorKind::Humidity => "💧",
            SensorKind::Pressure => "🧭",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorKind::Distance => "cm",
            SensorKind::Temperature => "°C",
            SensorKind::Humidity => "%",
            SensorKind::Pressure => "hPa",
        }
    }

    /// caption shown under the readout and on the chart's y axis
    pub fn label(self) -> String {
        format!("{} [{}]", self.title(), self.unit())
    }

    /// format the current value for the big readout
    ///
    /// temperature is shown as a whole number (truncated, not rounded),
    /// humidity and distance with two decimals.
    pub fn format_readout(self, value: f64) -> String {
        match self {
            SensorKind::Temperature => format!("{} {}", value.trunc() as i64, self.unit()),
            SensorKind::Humidity | SensorKind::Distance => {
                format!("{:.2} {}", value, self.unit())
            }
            SensorKind::Pressure => format!("{:.1} {}", value, self.unit()),
        }
    }

    /// project the stored bme sample onto this page's quantity
    ///
    /// distance is not part of the bme message, so it yields `None`.
    pub fn pick(self, sample: &BmeSample) -> Option<f64> {
        match self {
            SensorKind::Temperature => Some(sample.temperature),
            SensorKind::Humidity => Some(sample.humidity),
            SensorKind::Pressure => Some(sample.pressure),
            SensorKind::Distance => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readout_formats() {
        assert_eq!(SensorKind::Temperature.format_readout(23.9), "23 °C");
        assert_eq!(SensorKind::Temperature.format_readout(-0.5), "0 °C");
        assert_eq!(SensorKind::Humidity.format_readout(61.234), "61.23 %");
        assert_eq!(SensorKind::Distance.format_readout(42.0), "42.00 cm");
        assert_eq!(SensorKind::Pressure.format_readout(1013.24), "1013.2 hPa");
    }

    #[test]
    fn test_slug_roundtrip() {
        for kind in SensorKind::ALL {
            assert_eq!(SensorKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(SensorKind::from_slug("co2"), None);
    }

    #[test]
    fn test_sample_json_shape() {
        let sample = BmeSample {
            temperature: 23.5,
            humidity: 61.2,
            pressure: 1013.2,
            timestamp: "2026-10-18 12:00:00".to_string(),
        };
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value["temperature"], 23.5);
        assert_eq!(value["humidity"], 61.2);
        assert_eq!(value["pressure"], 1013.2);
        assert_eq!(value["timestamp"], "2026-10-18 12:00:00");
    }
}
