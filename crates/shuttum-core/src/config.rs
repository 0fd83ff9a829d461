use crate::{
    error::{Error, Result},
    types::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::{
    ops::{RangeFrom, RangeFull, RangeInclusive, RangeToInclusive},
    str::FromStr,
};

/// Policy for picking the sample of a modality that applies at a
/// queried timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Only a sample recorded at precisely the queried timestamp
    /// matches. Used by all point and range queries of a
    /// [Sequence](crate::Sequence).
    #[default]
    Exact,

    /// The sample closest to the queried timestamp. Ties go to the
    /// earlier sample.
    Nearest,

    /// A sample interpolated between the two recorded neighbours.
    /// Only defined for the IMU and ground truth.
    Linear,
}

impl FromStr for MatchPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(MatchPolicy::Exact),
            "nearest" => Ok(MatchPolicy::Nearest),
            "linear" => Ok(MatchPolicy::Linear),
            other => Err(Error::invalid_argument(format!(
                "unknown match policy \"{other}\": use one of \"exact\", \"nearest\" or \"linear\""
            ))),
        }
    }
}

/// A request for all records between two timestamps.
///
/// Both bounds are inclusive. `None` leaves the respective side open.
/// A `step` is accepted here so that slice-like requests can be
/// expressed, but range queries reject any step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeSlice {
    pub start: Option<Timestamp>,
    pub stop: Option<Timestamp>,
    pub step: Option<Timestamp>,
}

impl TimeSlice {
    pub fn new(start: Option<Timestamp>, stop: Option<Timestamp>) -> Self {
        Self {
            start,
            stop,
            step: None,
        }
    }

    /// Set the step
    pub fn with_step(mut self, step: Timestamp) -> Self {
        self.step = Some(step);
        self
    }
}

impl From<RangeInclusive<Timestamp>> for TimeSlice {
    fn from(range: RangeInclusive<Timestamp>) -> Self {
        let (start, stop) = range.into_inner();
        Self::new(Some(start), Some(stop))
    }
}

impl From<RangeFrom<Timestamp>> for TimeSlice {
    fn from(range: RangeFrom<Timestamp>) -> Self {
        Self::new(Some(range.start), None)
    }
}

impl From<RangeToInclusive<Timestamp>> for TimeSlice {
    fn from(range: RangeToInclusive<Timestamp>) -> Self {
        Self::new(None, Some(range.end))
    }
}

impl From<RangeFull> for TimeSlice {
    fn from(_: RangeFull) -> Self {
        Self::default()
    }
}

/// Options that are applied while a sequence is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Calibration sequences record `cam1` and `cam2` with global
    /// shutter and `cam3` and `cam4` with rolling shutter, regardless
    /// of the shutter types in `params.yaml`.
    pub calibration: bool,

    /// Keep only the stereo frames that both cameras of a rig captured.
    /// When disabled, a frame is kept if at least one camera captured
    /// it and the dropped side is `None`. Enabled by default.
    pub stereosync: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            calibration: false,
            stereosync: true,
        }
    }
}

impl LoadOptions {
    /// Create options for a calibration sequence.
    pub fn calibration() -> Self {
        Self {
            calibration: true,
            ..Self::default()
        }
    }

    /// Set the stereosync option
    pub fn with_stereosync(mut self, stereosync: bool) -> Self {
        self.stereosync = stereosync;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_default_is_exact() {
        assert_eq!(MatchPolicy::default(), MatchPolicy::Exact);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("nearest".parse::<MatchPolicy>(), Ok(MatchPolicy::Nearest));
        assert!(matches!(
            "cubic".parse::<MatchPolicy>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_slice_from_ranges() {
        assert_eq!(
            TimeSlice::from(5.0..=45.0),
            TimeSlice::new(Some(5.0), Some(45.0))
        );
        assert_eq!(TimeSlice::from(30.0..), TimeSlice::new(Some(30.0), None));
        assert_eq!(TimeSlice::from(..=10.0), TimeSlice::new(None, Some(10.0)));
        assert_eq!(TimeSlice::from(..), TimeSlice::new(None, None));
    }

    #[test]
    fn test_slice_with_step() {
        let slice = TimeSlice::from(..).with_step(-1.0);
        assert_eq!(slice.step, Some(-1.0));
    }

    #[test]
    fn test_load_options_default_to_stereosync() {
        let options = LoadOptions::default();
        assert!(options.stereosync);
        assert!(!options.calibration);

        let options = LoadOptions::calibration().with_stereosync(false);
        assert!(options.calibration);
        assert!(!options.stereosync);
    }
}
