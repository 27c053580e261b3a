//! ==============================================================================
//! store.rs - capped rolling sample stores
//! ==============================================================================
//!
//! purpose:
//! ```text
//!     keeps the most recent N samples, oldest evicted first.
//! ```
//!
//! ```text
//!     - JsonFileStore: a flat json array on disk, rewritten in full on every
//!       append (read-modify-write). used by the ingestion job (N = 100).
//!     - RollingBuffer: the in-memory variant (N = 50) the dashboard renders
//!       from.
//! ```
//!
//! concurrency:
//! ```text
//!     there is no file locking. two overlapping ingestion runs can lose an
//!     update (last writer wins), and a dashboard read that races a write may
//!     see a truncated file, which loads as empty history.
//! ```
//!
//! relationships:
//! ```text
//!     - used by: ingest.rs (append), dashboard.rs (load_recent)
//! ```
//!
//! ==============================================================================

use serde::{de::DeserializeOwned, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// file store cap used by the ingestion job
pub const DEFAULT_FILE_CAP: usize = 100;
/// in-memory cap used by the dashboard view buffers
pub const DEFAULT_BUFFER_CAP: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode samples: {0}")]
    Encode(#[from] serde_json::Error),
}

/// a capped, append-only sequence of samples in chronological order
pub trait SampleStore<T> {
    /// append one sample, evicting the oldest entries beyond the cap
    fn append(&mut self, sample: T) -> Result<(), StoreError>;

    /// every retained sample, oldest first. never fails: unreadable means empty
    fn load_recent(&self) -> Vec<T>;

    fn cap(&self) -> usize;
}

// ==============================================================================
// json file store
// ==============================================================================

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    cap: usize,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P, cap: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cap: cap.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all<T: Serialize>(&self, samples: &[T]) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(samples)?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

impl<T> SampleStore<T> for JsonFileStore
where
    T: Serialize + DeserializeOwned,
{
    fn append(&mut self, sample: T) -> Result<(), StoreError> {
        let mut samples: Vec<T> = self.load_recent();
        samples.push(sample);

        if samples.len() > self.cap {
            let excess = samples.len() - self.cap;
            samples.drain(..excess);
        }

        self.write_all(&samples)?;
        tracing::debug!(path = %self.path.display(), count = samples.len(), "sample file rewritten");
        Ok(())
    }

    fn load_recent(&self) -> Vec<T> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "sample file unreadable, treating as empty");
                return Vec::new();
            }
        };

        // anything other than a json array of samples counts as no history
        match serde_json::from_str::<Vec<T>>(&content) {
            Ok(samples) => samples,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "sample file malformed, treating as empty");
                Vec::new()
            }
        }
    }

    fn cap(&self) -> usize {
        self.cap
    }
}

// ==============================================================================
// in-memory rolling buffer
// ==============================================================================

#[derive(Debug, Clone)]
pub struct RollingBuffer<T> {
    items: VecDeque<T>,
    cap: usize,
}

impl<T> RollingBuffer<T> {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            items: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// fill a buffer from a store snapshot, keeping only the newest `cap`
    pub fn from_samples<I: IntoIterator<Item = T>>(cap: usize, samples: I) -> Self {
        let mut buffer = Self::new(cap);
        for sample in samples {
            buffer.push(sample);
        }
        buffer
    }

    pub fn push(&mut self, sample: T) {
        if self.items.len() == self.cap {
            self.items.pop_front();
        }
        self.items.push_back(sample);
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// project a numeric series out of the buffer, skipping samples that
    /// have no value for it
    pub fn values<F>(&self, f: F) -> Vec<f64>
    where
        F: Fn(&T) -> Option<f64>,
    {
        self.items.iter().filter_map(f).collect()
    }
}

impl<T: Clone> SampleStore<T> for RollingBuffer<T> {
    fn append(&mut self, sample: T) -> Result<(), StoreError> {
        self.push(sample);
        Ok(())
    }

    fn load_recent(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }

    fn cap(&self) -> usize {
        self.cap
    }
}
