//! ==============================================================================
//! parser.rs - text payload parsing for the two sensor topics
//! ==============================================================================
//!
//! purpose:
//! ```text
//!     the esp32 nodes publish human-readable text, not json:
//!     - distance topic: anything containing a number, e.g. "dist 42.5 cm"
//!     - bme280 topic:   "Temperature: 23.5 C, Humidity: 61.2 %, Pressure: 1013.2 hPa"
//! ```
//!
//! ```text
//!     both parsers return `None` on anything they cannot read. a garbled
//!     message is a skipped cycle for the caller, never a zero reading.
//! ```
//!
//! relationships:
//! ```text
//!     - used by: ingest.rs (bme payloads), dashboard.rs (live distance)
//!     - produces: domain.rs (BmeSample, DistanceSample)
//! ```
//!
//! ==============================================================================

use crate::domain::{BmeSample, DistanceSample, TIMESTAMP_FORMAT};

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

static DISTANCE_RE: OnceLock<Regex> = OnceLock::new();
static BME_RE: OnceLock<Regex> = OnceLock::new();

fn distance_re() -> &'static Regex {
    DISTANCE_RE.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("distance pattern is valid"))
}

// anchored at the start only: trailing text after "hPa" is tolerated
fn bme_re() -> &'static Regex {
    BME_RE.get_or_init(|| {
        Regex::new(r"^Temperature: ([0-9.]+) C, Humidity: ([0-9.]+) %, Pressure: ([0-9.]+) hPa")
            .expect("bme pattern is valid")
    })
}

/// decode a raw mqtt payload as utf-8 text
///
/// invalid utf-8 counts as an unparsable message.
pub fn decode_payload(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_owned)
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// parse a distance payload, stamping it with the current time
pub fn parse_distance(payload: &str) -> Option<DistanceSample> {
    parse_distance_at(payload, Local::now().naive_local())
}

/// parse a distance payload: the first decimal number anywhere in the text
pub fn parse_distance_at(payload: &str, now: NaiveDateTime) -> Option<DistanceSample> {
    let found = distance_re().find(payload)?;
    let value = found.as_str().parse::<f64>().ok()?;

    Some(DistanceSample {
        value,
        timestamp: format_timestamp(now),
    })
}

/// parse a bme280 payload, stamping it with the current time
pub fn parse_bme(payload: &str) -> Option<BmeSample> {
    parse_bme_at(payload, Local::now().naive_local())
}

/// parse a bme280 payload
///
/// all three fields must convert, otherwise the whole message is rejected.
pub fn parse_bme_at(payload: &str, now: NaiveDateTime) -> Option<BmeSample> {
    let caps = bme_re().captures(payload)?;
    let field = |i: usize| caps.get(i)?.as_str().parse::<f64>().ok();

    Some(BmeSample {
        temperature: field(1)?,
        humidity: field(2)?,
        pressure: field(3)?,
        timestamp: format_timestamp(now),
    })
}
