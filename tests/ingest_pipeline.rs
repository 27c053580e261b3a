//! end-to-end ingestion cycles against a real sample file

use sensor_dash::broker::{FetchError, MessageSource};
use sensor_dash::domain::BmeSample;
use sensor_dash::ingest::{run_once, IngestOutcome, SkipReason};
use sensor_dash::store::{JsonFileStore, SampleStore};

use std::sync::Mutex;

/// hands out queued payloads one fetch at a time
struct Scripted {
    replies: Mutex<Vec<Result<String, ()>>>,
}

impl Scripted {
    fn new(mut replies: Vec<Result<String, ()>>) -> Self {
        replies.reverse();
        Self { replies: Mutex::new(replies) }
    }
}

impl MessageSource for Scripted {
    fn fetch_one(&self, _topic: &str) -> Result<Vec<u8>, FetchError> {
        match self.replies.lock().unwrap().pop() {
            Some(Ok(payload)) => Ok(payload.into_bytes()),
            Some(Err(())) => Err(FetchError::Connection("connection refused".to_string())),
            None => Err(FetchError::Closed),
        }
    }
}

fn bme_payload(i: usize) -> String {
    format!(
        "Temperature: {}.5 C, Humidity: 60.{} %, Pressure: {} hPa",
        15 + i % 10,
        i % 10,
        950 + i
    )
}

#[test]
fn test_scenario_bme_message_lands_in_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("data.json"), 100);
    let source = Scripted::new(vec![Ok(
        "Temperature: 23.5 C, Humidity: 61.2 %, Pressure: 1013.2 hPa".to_string()
    )]);

    let outcome = run_once(&source, "esp32/sensor/BME280", &mut store).unwrap();
    let sample = match outcome {
        IngestOutcome::Stored(sample) => sample,
        other => panic!("expected a stored sample, got {:?}", other),
    };
    assert_eq!((sample.temperature, sample.humidity, sample.pressure), (23.5, 61.2, 1013.2));

    let loaded: Vec<BmeSample> = JsonFileStore::new(store.path(), 100).load_recent();
    assert_eq!(loaded, vec![sample]);
}

#[test]
fn test_failed_cycles_leave_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("data.json"), 100);
    let source = Scripted::new(vec![
        Ok(bme_payload(0)),
        Err(()),
        Ok("garbled".to_string()),
        Ok("Temperature: 23.5 C, Humidity: 61.2 %".to_string()),
    ]);

    assert!(run_once(&source, "t", &mut store).unwrap().is_stored());
    let before = std::fs::read(store.path()).unwrap();

    let outcome = run_once(&source, "t", &mut store).unwrap();
    assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::Fetch(_))));
    let outcome = run_once(&source, "t", &mut store).unwrap();
    assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::Unparsable(_))));
    let outcome = run_once(&source, "t", &mut store).unwrap();
    assert!(matches!(outcome, IngestOutcome::Skipped(SkipReason::Unparsable(_))));

    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[test]
fn test_150_cycles_keep_the_newest_100_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("nested").join("data.json"), 100);
    let source = Scripted::new((0..150).map(|i| Ok(bme_payload(i))).collect());

    for _ in 0..150 {
        assert!(run_once(&source, "t", &mut store).unwrap().is_stored());
    }

    let loaded: Vec<BmeSample> = store.load_recent();
    assert_eq!(loaded.len(), 100);
    // pressure encodes the cycle number, so order is checkable
    let pressures: Vec<f64> = loaded.iter().map(|s| s.pressure).collect();
    let expected: Vec<f64> = (50..150).map(|i| (950 + i) as f64).collect();
    assert_eq!(pressures, expected);
}
