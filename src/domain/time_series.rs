// Bounded sliding-window time series
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::solar_wind::Reading;

/// Default window size of the live chart.
pub const MAX_DATA_POINTS: usize = 30;

/// Fixed-capacity, oldest-first sequence of readings.
///
/// `append` returns a new buffer and leaves `self` untouched, so a snapshot
/// handed out to readers never changes underneath them. Once the window is
/// full the oldest reading is evicted (strict FIFO, no decimation).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesBuffer {
    capacity: NonZeroUsize,
    readings: Arc<VecDeque<Reading>>,
}

impl TimeSeriesBuffer {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            readings: Arc::new(VecDeque::with_capacity(capacity.get())),
        }
    }

    pub fn append(&self, reading: Reading) -> Self {
        let cap = self.capacity.get();
        let mut readings = VecDeque::with_capacity(cap);
        let skip = (self.readings.len() + 1).saturating_sub(cap);
        readings.extend(self.readings.iter().skip(skip).copied());
        readings.push_back(reading);

        Self {
            capacity: self.capacity,
            readings: Arc::new(readings),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    pub fn to_vec(&self) -> Vec<Reading> {
        self.readings.iter().copied().collect()
    }
}

impl Default for TimeSeriesBuffer {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(MAX_DATA_POINTS).unwrap_or(NonZeroUsize::MIN))
    }
}

impl Serialize for TimeSeriesBuffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.readings.len()))?;
        for reading in self.readings.iter() {
            seq.serialize_element(reading)?;
        }
        seq.end()
    }
}
