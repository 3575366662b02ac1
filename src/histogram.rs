use crate::error::Error;
use crate::key::PositionKey;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::collections::hash_map;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Bucket count a chunk-local histogram reserves up front. Large annotated
/// collections settle around 1.2 million distinct keys.
pub const LOCAL_CAPACITY_HINT: usize = 1_200_000;

/// Occurrence counts per position key.
///
/// `merge` is a pointwise sum, so folding any set of histograms in any order
/// gives the same counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: HashMap<PositionKey, u64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(capacity),
        }
    }

    pub fn increment(&mut self, key: PositionKey) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: PositionKey, count: u64) {
        *self.counts.entry(key).or_insert(0) += count;
    }

    pub fn get(&self, key: &PositionKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the number of scored positions seen.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn capacity(&self) -> usize {
        self.counts.capacity()
    }

    /// Releases buckets reserved beyond the current key count.
    pub fn shrink_to_fit(&mut self) {
        self.counts.shrink_to_fit();
    }

    pub fn iter(&self) -> hash_map::Iter<'_, PositionKey, u64> {
        self.counts.iter()
    }

    pub fn merge(&mut self, mut other: Histogram) {
        // Fold the smaller map into the larger one.
        if other.counts.len() > self.counts.len() {
            std::mem::swap(&mut self.counts, &mut other.counts);
        }
        for (key, count) in other.counts {
            self.add(key, count);
        }
    }

    /// JSON object from the rendered key to its count, keys in sorted order.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .counts
            .iter()
            .map(|(key, count)| (key.to_string(), Value::from(*count)))
            .collect();
        Value::Object(map)
    }

    /// Writes the pretty-printed artifact to `path`, replacing any existing file.
    pub fn write_json(&self, path: &Path) -> Result<(), Error> {
        let output_error = |source| Error::Output {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(output_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.to_json()).map_err(|e| {
            if e.is_io() {
                output_error(e.into())
            } else {
                Error::Json(e)
            }
        })?;
        writer.flush().map_err(output_error)
    }
}

impl FromIterator<PositionKey> for Histogram {
    fn from_iter<I: IntoIterator<Item = PositionKey>>(iter: I) -> Self {
        let mut histogram = Histogram::new();
        for key in iter {
            histogram.increment(key);
        }
        histogram
    }
}

/// The process-wide histogram. Each merge holds the lock for the whole fold,
/// so no two chunks ever update it at the same instant.
#[derive(Debug, Default)]
pub struct SharedHistogram {
    inner: Mutex<Histogram>,
}

impl SharedHistogram {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Histogram::with_capacity(capacity)),
        }
    }

    pub fn merge(&self, local: Histogram) {
        let mut global = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        global.merge(local);
    }

    /// Moves the accumulated counts out, leaving an empty histogram behind.
    pub fn take(&self) -> Histogram {
        let mut global = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *global)
    }

    pub fn into_inner(self) -> Histogram {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
