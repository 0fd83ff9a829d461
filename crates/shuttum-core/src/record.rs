use crate::{
    sample::{GroundTruthPose, ImuReading, StereoFrame},
    types::{Modality, Shutter, Timestamp, WithTimestamp},
};
use serde::Serialize;
use std::borrow::Cow;

/// Everything the sensors reported at one timestamp.
///
/// Each modality field is `None` if no sample matched. Frames always
/// refer to recorded samples. The IMU and ground truth fields are
/// borrowed for recorded samples and owned when they were synthesized
/// by [MatchPolicy::Linear](crate::MatchPolicy::Linear).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<'a> {
    pub stamp: Timestamp,
    pub global: Option<&'a StereoFrame>,
    pub rolling: Option<&'a StereoFrame>,
    pub imu: Option<Cow<'a, ImuReading>>,
    pub groundtruth: Option<Cow<'a, GroundTruthPose>>,
}

impl<'a> Record<'a> {
    /// A record with every modality absent.
    pub fn empty(stamp: Timestamp) -> Self {
        Self {
            stamp,
            global: None,
            rolling: None,
            imu: None,
            groundtruth: None,
        }
    }

    pub fn frame(&self, shutter: Shutter) -> Option<&'a StereoFrame> {
        match shutter {
            Shutter::Global => self.global,
            Shutter::Rolling => self.rolling,
        }
    }

    /// Checks if the modality has a sample in this record.
    pub fn has(&self, modality: Modality) -> bool {
        match modality {
            Modality::GlobalFrames => self.global.is_some(),
            Modality::RollingFrames => self.rolling.is_some(),
            Modality::Imu => self.imu.is_some(),
            Modality::GroundTruth => self.groundtruth.is_some(),
        }
    }

    /// The modalities that have a sample in this record.
    pub fn modalities(&self) -> impl Iterator<Item = Modality> + '_ {
        Modality::ALL
            .into_iter()
            .filter(|&modality| self.has(modality))
    }

    /// Checks if all modalities are absent.
    pub fn is_empty(&self) -> bool {
        self.modalities().next().is_none()
    }
}

impl WithTimestamp for Record<'_> {
    fn timestamp(&self) -> Timestamp {
        self.stamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_has_no_modalities() {
        let record = Record::empty(1.0);
        assert!(record.is_empty());
        assert_eq!(record.modalities().count(), 0);
        assert_eq!(record.timestamp(), 1.0);
    }

    #[test]
    fn test_record_reports_present_modalities() {
        let imu = ImuReading {
            stamp: 1.0,
            acceleration: [0.0; 3],
            angular_velocity: [0.0; 3],
        };
        let record = Record {
            imu: Some(Cow::Borrowed(&imu)),
            ..Record::empty(1.0)
        };

        assert!(!record.is_empty());
        assert!(record.has(Modality::Imu));
        assert!(!record.has(Modality::GroundTruth));
        assert_eq!(record.modalities().collect::<Vec<_>>(), [Modality::Imu]);
        assert!(record.frame(Shutter::Global).is_none());
    }
}
