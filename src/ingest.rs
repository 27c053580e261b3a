//! ==============================================================================
//! ingest.rs - one ingestion cycle
//! ==============================================================================
//!
//! purpose:
//! ```text
//!     fetch one bme280 message, parse it, append it to the sample store.
//!     a failed fetch or an unparsable payload skips the cycle and leaves the
//!     store untouched; only a failed write is an error.
//! ```
//!
//! ```text
//!     the cycle is meant to be triggered by an external scheduler (cron, a
//!     systemd timer). it keeps no state between runs.
//! ```
//!
//! relationships:
//! ```text
//!     - used by: bin/ingest.rs
//!     - uses: broker.rs (fetch_one), parser.rs (parse_bme), store.rs (append)
//! ```
//!
//! ==============================================================================

use crate::broker::{FetchError, MessageSource};
use crate::domain::BmeSample;
use crate::parser;
use crate::store::{SampleStore, StoreError};

/// why a cycle wrote nothing
#[derive(Debug)]
pub enum SkipReason {
    Fetch(FetchError),
    Unparsable(String),
}

#[derive(Debug)]
pub enum IngestOutcome {
    Stored(BmeSample),
    Skipped(SkipReason),
}

impl IngestOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, IngestOutcome::Stored(_))
    }
}

/// run exactly one fetch-parse-append cycle
pub fn run_once<S, T>(source: &S, topic: &str, store: &mut T) -> Result<IngestOutcome, StoreError>
where
    S: MessageSource + ?Sized,
    T: SampleStore<BmeSample> + ?Sized,
{
    let raw = match source.fetch_one(topic) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(topic, error = %e, "[INGEST] fetch failed, skipping cycle");
            return Ok(IngestOutcome::Skipped(SkipReason::Fetch(e)));
        }
    };

    let text = String::from_utf8_lossy(&raw).into_owned();
    let sample = match parser::decode_payload(&raw).and_then(|p| parser::parse_bme(&p)) {
        Some(sample) => sample,
        None => {
            tracing::warn!(topic, payload = %text, "[INGEST] failed to parse bme message, skipping");
            return Ok(IngestOutcome::Skipped(SkipReason::Unparsable(text)));
        }
    };

    tracing::info!(
        "[BME280] Temp: {:.1}°C | Humidity: {:.1}% | Pressure: {:.1} hPa",
        sample.temperature,
        sample.humidity,
        sample.pressure
    );

    store.append(sample.clone())?;
    Ok(IngestOutcome::Stored(sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RollingBuffer;

    struct Fixed(Result<&'static [u8], ()>);

    impl MessageSource for Fixed {
        fn fetch_one(&self, _topic: &str) -> Result<Vec<u8>, FetchError> {
            self.0.map(|b| b.to_vec()).map_err(|_| FetchError::Closed)
        }
    }

    #[test]
    fn test_valid_message_is_stored() {
        let source = Fixed(Ok(b"Temperature: 23.5 C, Humidity: 61.2 %, Pressure: 1013.2 hPa"));
        let mut store = RollingBuffer::new(10);

        let outcome = run_once(&source, "bme", &mut store).unwrap();
        assert!(outcome.is_stored());
        let stored = store.load_recent();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].pressure, 1013.2);
    }

    #[test]
    fn test_fetch_failure_skips() {
        let mut store: RollingBuffer<BmeSample> = RollingBuffer::new(10);
        let outcome = run_once(&Fixed(Err(())), "bme", &mut store).unwrap();
        assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::Fetch(FetchError::Closed))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_garbled_payload_skips() {
        let mut store: RollingBuffer<BmeSample> = RollingBuffer::new(10);
        let outcome = run_once(&Fixed(Ok(b"garbled")), "bme", &mut store).unwrap();
        assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::Unparsable(ref p)) if p == "garbled"));
        assert!(store.is_empty());

        let outcome = run_once(&Fixed(Ok(&[0xff, 0xfe])), "bme", &mut store).unwrap();
        assert!(!outcome.is_stored());
        assert!(store.is_empty());
    }
}
