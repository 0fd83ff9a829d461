use crate::{
    config::{MatchPolicy, TimeSlice},
    error::{Error, Result},
    record::Record,
    sample::{GroundTruthPose, ImuReading, Interpolate, StereoFrame},
    stream::SensorStream,
    timeline::Timeline,
    types::{Modality, Shutter, Timestamp, WithTimestamp},
};
use std::{borrow::Cow, iter::FusedIterator, slice};
use tracing::debug;

/// The four sample streams of a sequence.
#[derive(Debug, Clone, Default)]
pub struct Streams {
    pub global: SensorStream<StereoFrame>,
    pub rolling: SensorStream<StereoFrame>,
    pub imu: SensorStream<ImuReading>,
    pub groundtruth: SensorStream<GroundTruthPose>,
}

impl Streams {
    pub fn frames(&self, shutter: Shutter) -> &SensorStream<StereoFrame> {
        match shutter {
            Shutter::Global => &self.global,
            Shutter::Rolling => &self.rolling,
        }
    }

    /// Number of samples recorded for the modality.
    pub fn count(&self, modality: Modality) -> usize {
        match modality {
            Modality::GlobalFrames => self.global.len(),
            Modality::RollingFrames => self.rolling.len(),
            Modality::Imu => self.imu.len(),
            Modality::GroundTruth => self.groundtruth.len(),
        }
    }
}

/// Answers point and range queries across all streams of a sequence.
///
/// The engine owns the streams and the [Timeline] built from them. It
/// never mutates either after construction, so any number of readers
/// may query it at the same time.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    streams: Streams,
    timeline: Timeline,
}

impl QueryEngine {
    pub fn new(streams: Streams) -> Self {
        let inputs: [Box<dyn Iterator<Item = Timestamp> + '_>; 4] = [
            Box::new(streams.global.timestamps()),
            Box::new(streams.rolling.timestamps()),
            Box::new(streams.imu.timestamps()),
            Box::new(streams.groundtruth.timestamps()),
        ];
        let timeline = Timeline::build(inputs);

        debug!(
            global = streams.global.len(),
            rolling = streams.rolling.len(),
            imu = streams.imu.len(),
            groundtruth = streams.groundtruth.len(),
            stamps = timeline.len(),
            "built timeline"
        );

        Self { streams, timeline }
    }

    pub fn streams(&self) -> &Streams {
        &self.streams
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Looks up the stereo frame of one rig.
    ///
    /// Frames are discrete, so [MatchPolicy::Linear] is rejected.
    pub fn frame(
        &self,
        shutter: Shutter,
        stamp: Timestamp,
        policy: MatchPolicy,
    ) -> Result<Option<&StereoFrame>> {
        match_discrete(self.streams.frames(shutter), shutter.modality(), stamp, policy)
    }

    pub fn imu(&self, stamp: Timestamp, policy: MatchPolicy) -> Result<Option<Cow<'_, ImuReading>>> {
        match_continuous(&self.streams.imu, Modality::Imu, stamp, policy)
    }

    pub fn groundtruth(
        &self,
        stamp: Timestamp,
        policy: MatchPolicy,
    ) -> Result<Option<Cow<'_, GroundTruthPose>>> {
        match_continuous(&self.streams.groundtruth, Modality::GroundTruth, stamp, policy)
    }

    /// Resolves every modality at `stamp` under `policy`.
    ///
    /// Under [MatchPolicy::Linear] the frames, which cannot be
    /// interpolated, are matched exactly. Interpolation fails with
    /// [Error::OutOfRange] if `stamp` is not covered by the IMU or the
    /// ground truth stream.
    pub fn resolve(&self, stamp: Timestamp, policy: MatchPolicy) -> Result<Record<'_>> {
        let frame_policy = match policy {
            MatchPolicy::Linear => MatchPolicy::Exact,
            other => other,
        };

        Ok(Record {
            stamp,
            global: self.frame(Shutter::Global, stamp, frame_policy)?,
            rolling: self.frame(Shutter::Rolling, stamp, frame_policy)?,
            imu: self.imu(stamp, policy)?,
            groundtruth: self.groundtruth(stamp, policy)?,
        })
    }

    /// Resolves every modality at `stamp` with exact matching. This
    /// cannot fail: modalities without a sample at `stamp` are absent.
    pub fn point(&self, stamp: Timestamp) -> Record<'_> {
        Record {
            stamp,
            global: self.streams.global.find_exact(stamp),
            rolling: self.streams.rolling.find_exact(stamp),
            imu: self.streams.imu.find_exact(stamp).map(Cow::Borrowed),
            groundtruth: self.streams.groundtruth.find_exact(stamp).map(Cow::Borrowed),
        }
    }

    /// Iterates the records of all timeline stamps `t` with
    /// `start <= t <= stop`, in ascending order.
    pub fn range(&self, start: Option<Timestamp>, stop: Option<Timestamp>) -> Range<'_> {
        Range {
            engine: self,
            stamps: self.timeline.window(start, stop).iter(),
        }
    }

    /// Like [range](Self::range), but takes a [TimeSlice]. A slice with
    /// a step is rejected before anything is iterated.
    pub fn slice(&self, slice: TimeSlice) -> Result<Range<'_>> {
        let TimeSlice { start, stop, step } = slice;

        if let Some(step) = step {
            return Err(Error::invalid_argument(format!(
                "slicing with a step value like {}:{}:{step} is not supported",
                fmt_bound(start),
                fmt_bound(stop),
            )));
        }

        Ok(self.range(start, stop))
    }
}

fn fmt_bound(bound: Option<Timestamp>) -> String {
    bound.map(|ts| ts.to_string()).unwrap_or_default()
}

fn match_discrete<T>(
    stream: &SensorStream<T>,
    modality: Modality,
    stamp: Timestamp,
    policy: MatchPolicy,
) -> Result<Option<&T>>
where
    T: WithTimestamp,
{
    match policy {
        MatchPolicy::Exact => Ok(stream.find_exact(stamp)),
        MatchPolicy::Nearest => Ok(stream.find_nearest(stamp)),
        MatchPolicy::Linear => Err(Error::invalid_argument(format!(
            "{modality} are discrete and cannot be interpolated"
        ))),
    }
}

fn match_continuous<T>(
    stream: &SensorStream<T>,
    modality: Modality,
    stamp: Timestamp,
    policy: MatchPolicy,
) -> Result<Option<Cow<'_, T>>>
where
    T: Interpolate,
{
    match policy {
        MatchPolicy::Exact => Ok(stream.find_exact(stamp).map(Cow::Borrowed)),
        MatchPolicy::Nearest => Ok(stream.find_nearest(stamp).map(Cow::Borrowed)),
        MatchPolicy::Linear => {
            let Some((before, after)) = stream.bracket(stamp) else {
                return Err(Error::out_of_range(
                    modality,
                    stamp,
                    stream.timestamp_range(),
                ));
            };

            // Recorded samples are returned as they are.
            if before.timestamp() == after.timestamp() {
                return Ok(Some(Cow::Borrowed(before)));
            }

            Ok(Some(Cow::Owned(T::interpolate(before, after, stamp))))
        }
    }
}

/// A lazy sequence of [Record]s over a window of the timeline,
/// returned by [QueryEngine::range].
///
/// Each record is resolved when it is pulled. A clone continues from
/// the same position. Call [QueryEngine::range] again to start over.
#[derive(Debug, Clone)]
pub struct Range<'a> {
    engine: &'a QueryEngine,
    stamps: slice::Iter<'a, Timestamp>,
}

impl<'a> Range<'a> {
    /// The stamps that are yet to be yielded.
    pub fn stamps(&self) -> &'a [Timestamp] {
        self.stamps.as_slice()
    }
}

impl<'a> Iterator for Range<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let stamp = *self.stamps.next()?;
        Some(self.engine.point(stamp))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stamps.size_hint()
    }
}

impl DoubleEndedIterator for Range<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let stamp = *self.stamps.next_back()?;
        Some(self.engine.point(stamp))
    }
}

impl ExactSizeIterator for Range<'_> {}

impl FusedIterator for Range<'_> {}
