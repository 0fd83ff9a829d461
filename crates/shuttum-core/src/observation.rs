//! Iteration over a single stream with on-demand lookups of the
//! other modalities.
//!
//! Walking one stream directly is the cheap way to traverse a
//! sequence. Each yielded [Observation] remembers the
//! [QueryEngine] it came from, so the matching samples of the other
//! modalities can be looked up at its timestamp only when needed.

use crate::{
    config::MatchPolicy,
    engine::QueryEngine,
    error::Result,
    record::Record,
    sample::{GroundTruthPose, ImuReading, StereoFrame},
    types::{Shutter, Timestamp, WithTimestamp},
};
use std::{borrow::Cow, cmp::Ordering, fmt, iter::FusedIterator, ops::Deref, slice};

/// A recorded sample together with a reference to the engine that
/// holds the other modalities.
pub struct Observation<'a, T> {
    sample: &'a T,
    engine: &'a QueryEngine,
}

impl<T> Clone for Observation<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Observation<'_, T> {}

impl<T> fmt::Debug for Observation<'_, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observation")
            .field("sample", self.sample)
            .finish_non_exhaustive()
    }
}

impl<'a, T> Observation<'a, T>
where
    T: WithTimestamp,
{
    pub fn new(sample: &'a T, engine: &'a QueryEngine) -> Self {
        Self { sample, engine }
    }

    pub fn stamp(&self) -> Timestamp {
        self.sample.timestamp()
    }

    pub fn sample(&self) -> &'a T {
        self.sample
    }

    /// The stereo frame of one rig at this observation's timestamp.
    pub fn stereo(&self, shutter: Shutter, policy: MatchPolicy) -> Result<Option<&'a StereoFrame>> {
        self.engine.frame(shutter, self.stamp(), policy)
    }

    pub fn imu(&self, policy: MatchPolicy) -> Result<Option<Cow<'a, ImuReading>>> {
        self.engine.imu(self.stamp(), policy)
    }

    pub fn groundtruth(&self, policy: MatchPolicy) -> Result<Option<Cow<'a, GroundTruthPose>>> {
        self.engine.groundtruth(self.stamp(), policy)
    }

    /// All modalities recorded at exactly this observation's timestamp.
    pub fn record(&self) -> Record<'a> {
        self.engine.point(self.stamp())
    }
}

impl<T> Deref for Observation<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.sample
    }
}

impl<T> WithTimestamp for Observation<'_, T>
where
    T: WithTimestamp,
{
    fn timestamp(&self) -> Timestamp {
        self.sample.timestamp()
    }
}

/// Iterates the samples of one stream as [Observation]s.
#[derive(Debug)]
pub struct Observations<'a, T> {
    samples: slice::Iter<'a, T>,
    engine: &'a QueryEngine,
}

impl<T> Clone for Observations<'_, T> {
    fn clone(&self) -> Self {
        Self {
            samples: self.samples.clone(),
            engine: self.engine,
        }
    }
}

impl<'a, T> Observations<'a, T> {
    pub fn new(samples: &'a [T], engine: &'a QueryEngine) -> Self {
        Self {
            samples: samples.iter(),
            engine,
        }
    }
}

impl<'a, T> Iterator for Observations<'a, T>
where
    T: WithTimestamp,
{
    type Item = Observation<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.samples.next()?;
        Some(Observation::new(sample, self.engine))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.samples.size_hint()
    }
}

impl<T> DoubleEndedIterator for Observations<'_, T>
where
    T: WithTimestamp,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let sample = self.samples.next_back()?;
        Some(Observation::new(sample, self.engine))
    }
}

impl<T> ExactSizeIterator for Observations<'_, T> where T: WithTimestamp {}

impl<T> FusedIterator for Observations<'_, T> where T: WithTimestamp {}

/// The frames of both rigs captured at the same trigger. A rig that
/// dropped the trigger is `None`.
#[derive(Debug, Clone, Copy)]
pub struct StereoPair<'a> {
    pub stamp: Timestamp,
    pub global: Option<Observation<'a, StereoFrame>>,
    pub rolling: Option<Observation<'a, StereoFrame>>,
}

/// Iterates the frames of both rigs, joined by timestamp.
#[derive(Debug, Clone)]
pub struct StereoPairs<'a> {
    global: &'a [StereoFrame],
    rolling: &'a [StereoFrame],
    engine: &'a QueryEngine,
}

impl<'a> StereoPairs<'a> {
    pub fn new(engine: &'a QueryEngine) -> Self {
        let streams = engine.streams();
        Self {
            global: streams.global.as_slice(),
            rolling: streams.rolling.as_slice(),
            engine,
        }
    }
}

impl<'a> Iterator for StereoPairs<'a> {
    type Item = StereoPair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let order = match (self.global.first(), self.rolling.first()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(global), Some(rolling)) => global.stamp.total_cmp(&rolling.stamp),
        };

        let global = if order.is_le() {
            take_first(&mut self.global)
        } else {
            None
        };
        let rolling = if order.is_ge() {
            take_first(&mut self.rolling)
        } else {
            None
        };
        let stamp = global.or(rolling)?.stamp;

        Some(StereoPair {
            stamp,
            global: global.map(|frame| Observation::new(frame, self.engine)),
            rolling: rolling.map(|frame| Observation::new(frame, self.engine)),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (global, rolling) = (self.global.len(), self.rolling.len());
        (global.max(rolling), Some(global + rolling))
    }
}

impl FusedIterator for StereoPairs<'_> {}

fn take_first<'a, T>(samples: &mut &'a [T]) -> Option<&'a T> {
    let (first, rest) = samples.split_first()?;
    *samples = rest;
    Some(first)
}

/// The frames of one or both rigs, as selected by a
/// [ShutterSelector](crate::ShutterSelector).
#[derive(Debug, Clone)]
pub enum CameraView<'a> {
    Global(Observations<'a, StereoFrame>),
    Rolling(Observations<'a, StereoFrame>),
    Both(StereoPairs<'a>),
}

impl<'a> CameraView<'a> {
    /// The frames of a single rig, or `None` for [CameraView::Both].
    pub fn single(self) -> Option<Observations<'a, StereoFrame>> {
        match self {
            CameraView::Global(frames) | CameraView::Rolling(frames) => Some(frames),
            CameraView::Both(_) => None,
        }
    }

    /// The frame pairs of both rigs, or `None` for a single rig.
    pub fn both(self) -> Option<StereoPairs<'a>> {
        match self {
            CameraView::Both(pairs) => Some(pairs),
            _ => None,
        }
    }
}
