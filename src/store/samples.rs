//! In-memory sample history with a rolling buffer
//!
//! Samples are kept in arrival order; once the buffer reaches its capacity the
//! oldest samples are dropped.

use crate::error::StoreError;
use crate::events::{MetricType, Sample};
use crate::store::SampleStore;
use log::debug;
use std::collections::VecDeque;
use std::sync::RwLock;

/// Default number of samples kept in memory
pub const DEFAULT_MAX_SAMPLES: usize = 1000;

/// Sample store backed by a bounded `VecDeque`
#[derive(Debug)]
pub struct MemorySampleStore {
    buffer: RwLock<VecDeque<Sample>>,
    max_size: usize,
}

impl MemorySampleStore {
    /// Create a store that keeps at most `max_size` samples
    ///
    /// # Examples
    ///
    /// ```
    /// use hostwatch::store::{MemorySampleStore, SampleStore};
    ///
    /// let store = MemorySampleStore::new(1000);
    /// assert!(store.recent(10).unwrap().is_empty());
    /// ```
    pub fn new(max_size: usize) -> Self {
        Self {
            buffer: RwLock::new(VecDeque::with_capacity(max_size)),
            max_size,
        }
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.buffer.read().map(|buffer| buffer.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySampleStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}

impl SampleStore for MemorySampleStore {
    fn append(&self, sample: Sample) -> Result<(), StoreError> {
        let mut buffer = self.buffer.write()?;
        buffer.push_back(sample);

        while buffer.len() > self.max_size {
            if let Some(evicted) = buffer.pop_front() {
                debug!(
                    "Evicted {} sample from {} (retention {})",
                    evicted.metric_type, evicted.timestamp, self.max_size
                );
            }
        }

        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Sample>, StoreError> {
        let buffer = self.buffer.read()?;
        Ok(buffer.iter().rev().take(limit).cloned().collect())
    }

    fn latest(&self, metric_type: MetricType) -> Result<Option<Sample>, StoreError> {
        let buffer = self.buffer.read()?;
        Ok(buffer
            .iter()
            .rev()
            .find(|sample| sample.metric_type == metric_type)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample_at(metric_type: MetricType, value: f64, offset_seconds: i64) -> Sample {
        Sample::new(metric_type, value, Utc::now() + Duration::seconds(offset_seconds))
    }

    #[test]
    fn test_recent_is_newest_first() {
        let store = MemorySampleStore::new(10);
        store.append(sample_at(MetricType::Cpu, 10.0, 0)).unwrap();
        store.append(sample_at(MetricType::Memory, 20.0, 1)).unwrap();
        store.append(sample_at(MetricType::Cpu, 30.0, 2)).unwrap();

        let recent = store.recent(10).unwrap();
        let values: Vec<f64> = recent.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![30.0, 20.0, 10.0]);

        assert_eq!(store.recent(2).unwrap().len(), 2);
    }

    #[test]
    fn test_latest_per_type() {
        let store = MemorySampleStore::new(10);
        assert!(store.latest(MetricType::Cpu).unwrap().is_none());

        store.append(sample_at(MetricType::Cpu, 10.0, 0)).unwrap();
        store.append(sample_at(MetricType::Memory, 20.0, 1)).unwrap();
        store.append(sample_at(MetricType::Cpu, 30.0, 2)).unwrap();

        assert_eq!(store.latest(MetricType::Cpu).unwrap().unwrap().value, 30.0);
        assert_eq!(
            store.latest(MetricType::Memory).unwrap().unwrap().value,
            20.0
        );
    }

    #[test]
    fn test_capacity_enforcement() {
        let store = MemorySampleStore::new(3);
        for i in 0..5 {
            store
                .append(sample_at(MetricType::Cpu, i as f64, i))
                .unwrap();
        }

        assert_eq!(store.len(), 3);
        let values: Vec<f64> = store.recent(10).unwrap().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_default_retention() {
        let store = MemorySampleStore::default();
        for i in 0..(DEFAULT_MAX_SAMPLES + 5) {
            store
                .append(sample_at(MetricType::Memory, 50.0, i as i64))
                .unwrap();
        }
        assert_eq!(store.len(), DEFAULT_MAX_SAMPLES);
    }
}
