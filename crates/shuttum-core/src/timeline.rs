use crate::types::Timestamp;
use itertools::Itertools;
use std::slice;

/// The sorted, de-duplicated union of the timestamps of all streams
/// in a sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    stamps: Vec<Timestamp>,
}

impl Timeline {
    /// Merges the timestamps of several streams.
    ///
    /// Each input must be sorted in ascending order, which holds for
    /// the timestamps of any [SensorStream](crate::stream::SensorStream).
    pub fn build<I, S>(streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = Timestamp>,
    {
        let stamps: Vec<_> = itertools::kmerge_by(streams, |a: &Timestamp, b: &Timestamp| a < b)
            .dedup()
            .collect();

        debug_assert!(
            stamps.windows(2).all(|pair| pair[0] < pair[1]),
            "timeline inputs must be sorted"
        );

        Self { stamps }
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn first(&self) -> Option<Timestamp> {
        self.stamps.first().copied()
    }

    pub fn last(&self) -> Option<Timestamp> {
        self.stamps.last().copied()
    }

    pub fn as_slice(&self) -> &[Timestamp] {
        &self.stamps
    }

    pub fn iter(&self) -> std::iter::Copied<slice::Iter<'_, Timestamp>> {
        self.stamps.iter().copied()
    }

    pub fn contains(&self, stamp: Timestamp) -> bool {
        let idx = self.stamps.partition_point(|&ts| ts < stamp);
        self.stamps.get(idx) == Some(&stamp)
    }

    /// The stamps `t` that are neither below `start` nor above `stop`.
    /// Both bounds are inclusive and an open bound extends to the
    /// respective end of the timeline. A NaN bound excludes nothing.
    pub fn window(&self, start: Option<Timestamp>, stop: Option<Timestamp>) -> &[Timestamp] {
        let lo = match start {
            Some(start) => self.stamps.partition_point(|&ts| ts < start),
            None => 0,
        };
        let hi = match stop {
            Some(stop) if !stop.is_nan() => self.stamps.partition_point(|&ts| ts <= stop),
            _ => self.stamps.len(),
        };

        if lo >= hi { &[] } else { &self.stamps[lo..hi] }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = Timestamp;
    type IntoIter = std::iter::Copied<slice::Iter<'a, Timestamp>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(streams: &[&[f64]]) -> Timeline {
        Timeline::build(streams.iter().map(|stream| stream.iter().copied()))
    }

    #[test]
    fn test_build_merges_and_deduplicates() {
        let timeline = build(&[&[0.0, 1.0, 2.0], &[0.5, 1.5], &[1.0]]);
        assert_eq!(timeline.as_slice(), &[0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_build_empty_streams() {
        let timeline = build(&[&[], &[], &[], &[]]);
        assert!(timeline.is_empty());
        assert_eq!(timeline.first(), None);
        assert_eq!(timeline.last(), None);
    }

    #[test]
    fn test_build_single_non_empty_stream() {
        let timeline = build(&[&[], &[3.0, 4.0], &[]]);
        assert_eq!(timeline.as_slice(), &[3.0, 4.0]);
    }

    #[test]
    fn test_build_identical_streams_collapse() {
        let timeline = build(&[&[1.0, 2.0], &[1.0, 2.0], &[1.0, 2.0]]);
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_contains() {
        let timeline = build(&[&[0.0, 1.0], &[0.5]]);
        assert!(timeline.contains(0.5));
        assert!(!timeline.contains(0.75));
        assert!(!timeline.contains(2.0));
    }

    #[test]
    fn test_window_inclusive_bounds() {
        let timeline = build(&[&[0.0, 0.5, 1.0, 1.5, 2.0]]);
        assert_eq!(timeline.window(Some(0.5), Some(1.5)), &[0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_window_open_bounds() {
        let timeline = build(&[&[0.0, 0.5, 1.0]]);
        assert_eq!(timeline.window(None, Some(0.5)), &[0.0, 0.5]);
        assert_eq!(timeline.window(Some(0.5), None), &[0.5, 1.0]);
        assert_eq!(timeline.window(None, None), timeline.as_slice());
    }

    #[test]
    fn test_window_empty_when_reversed() {
        let timeline = build(&[&[0.0, 0.5, 1.0]]);
        assert!(timeline.window(Some(1.0), Some(0.0)).is_empty());
        assert!(timeline.window(Some(5.0), None).is_empty());
    }

    #[test]
    fn test_window_nan_bound_excludes_nothing() {
        let timeline = build(&[&[0.0, 0.5, 1.0]]);
        assert_eq!(timeline.window(None, Some(f64::NAN)), timeline.as_slice());
        assert_eq!(timeline.window(Some(f64::NAN), None), timeline.as_slice());
        assert_eq!(timeline.window(Some(0.5), Some(f64::NAN)), &[0.5, 1.0]);
    }
}
