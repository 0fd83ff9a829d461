use crate::types::{Timestamp, WithTimestamp};
use std::slice;

/// A sequence of samples of one modality with strictly increasing
/// timestamps.
///
/// Streams are filled once while a sequence is loaded and only read
/// afterwards. All lookups are binary searches over the sorted
/// samples.
#[derive(Debug, Clone)]
pub struct SensorStream<T>
where
    T: WithTimestamp,
{
    samples: Vec<T>,
    last_ts: Option<Timestamp>,
}

impl<T> Default for SensorStream<T>
where
    T: WithTimestamp,
{
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            last_ts: None,
        }
    }
}

impl<T> SensorStream<T>
where
    T: WithTimestamp,
{
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            last_ts: None,
        }
    }

    /// Wraps samples that are already ordered by timestamp.
    ///
    /// The ordering is trusted. It is only verified in debug builds.
    pub fn from_sorted(samples: Vec<T>) -> Self {
        debug_assert!(
            samples
                .windows(2)
                .all(|pair| pair[0].timestamp() < pair[1].timestamp()),
            "stream samples must have strictly increasing timestamps"
        );
        let last_ts = samples.last().map(|sample| sample.timestamp());
        Self { samples, last_ts }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.samples.last()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.samples
    }

    /// Iterates the timestamps of all samples in ascending order.
    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.samples.iter().map(|sample| sample.timestamp())
    }

    /// The first and the last recorded timestamp.
    pub fn timestamp_range(&self) -> Option<(Timestamp, Timestamp)> {
        let first = self.samples.first()?.timestamp();
        let last = self.samples.last()?.timestamp();
        Some((first, last))
    }

    /// Try to push a sample to the end of the stream.
    ///
    /// If the timestamp on the sample is not above that of the
    /// previously inserted sample, the sample is handed back. A NaN
    /// timestamp is never above any other.
    pub fn try_push(&mut self, item: T) -> Result<(), T> {
        let timestamp = item.timestamp();

        if timestamp.is_nan() {
            return Err(item);
        }
        match self.last_ts {
            Some(last_ts) if last_ts >= timestamp => return Err(item),
            _ => {}
        }

        self.last_ts = Some(timestamp);
        self.samples.push(item);
        Ok(())
    }

    /// Index of the first sample at or after `stamp`.
    fn lower_bound(&self, stamp: Timestamp) -> usize {
        self.samples
            .partition_point(|sample| sample.timestamp() < stamp)
    }

    /// Finds the sample recorded at exactly `stamp`.
    pub fn find_exact(&self, stamp: Timestamp) -> Option<&T> {
        let sample = self.samples.get(self.lower_bound(stamp))?;
        (sample.timestamp() == stamp).then_some(sample)
    }

    /// Finds the sample closest to `stamp`. On a tie the earlier sample
    /// wins.
    pub fn find_nearest(&self, stamp: Timestamp) -> Option<&T> {
        let idx = self.lower_bound(stamp);
        let after = self.samples.get(idx);
        let before = idx.checked_sub(1).and_then(|idx| self.samples.get(idx));

        match (before, after) {
            (Some(before), Some(after)) => {
                let dist_before = stamp - before.timestamp();
                let dist_after = after.timestamp() - stamp;
                if dist_before <= dist_after {
                    Some(before)
                } else {
                    Some(after)
                }
            }
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        }
    }

    /// Finds the two samples surrounding `stamp`.
    ///
    /// Returns the same sample twice if one is recorded at exactly
    /// `stamp`, and `None` if `stamp` lies outside of the stream.
    pub fn bracket(&self, stamp: Timestamp) -> Option<(&T, &T)> {
        let idx = self.lower_bound(stamp);
        let after = self.samples.get(idx)?;

        if after.timestamp() == stamp {
            return Some((after, after));
        }

        let before = self.samples.get(idx.checked_sub(1)?)?;
        Some((before, after))
    }
}

impl<'a, T> IntoIterator for &'a SensorStream<T>
where
    T: WithTimestamp,
{
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
