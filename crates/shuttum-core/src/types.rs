use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Seconds since the recording epoch, with sub-second precision.
pub type Timestamp = f64;

/// Gives access to the timestamp of a sample kept in a
/// [SensorStream](crate::stream::SensorStream).
pub trait WithTimestamp {
    fn timestamp(&self) -> Timestamp;
}

impl<T> WithTimestamp for &T
where
    T: WithTimestamp,
{
    fn timestamp(&self) -> Timestamp {
        (**self).timestamp()
    }
}

/// The acquisition mode of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shutter {
    /// All rows are exposed simultaneously.
    Global,
    /// Rows are exposed one after another with a fixed delay.
    Rolling,
}

impl Shutter {
    pub const ALL: [Shutter; 2] = [Shutter::Global, Shutter::Rolling];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shutter::Global => "global",
            Shutter::Rolling => "rolling",
        }
    }

    pub fn modality(&self) -> Modality {
        match self {
            Shutter::Global => Modality::GlobalFrames,
            Shutter::Rolling => Modality::RollingFrames,
        }
    }
}

impl fmt::Display for Shutter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shutter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "global" => Ok(Shutter::Global),
            "rolling" => Ok(Shutter::Rolling),
            other => Err(Error::invalid_argument(format!(
                "unknown shutter type \"{other}\": use either \"global\" or \"rolling\""
            ))),
        }
    }
}

/// Selects one of the two stereo rigs, or both of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShutterSelector {
    Global,
    Rolling,
    #[default]
    Both,
}

impl From<Shutter> for ShutterSelector {
    fn from(shutter: Shutter) -> Self {
        match shutter {
            Shutter::Global => ShutterSelector::Global,
            Shutter::Rolling => ShutterSelector::Rolling,
        }
    }
}

impl FromStr for ShutterSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "both" => Ok(ShutterSelector::Both),
            "global" => Ok(ShutterSelector::Global),
            "rolling" => Ok(ShutterSelector::Rolling),
            other => Err(Error::invalid_argument(format!(
                "unknown shutter type: use either \"global\", \"rolling\", or \"both\" and not \"{other}\""
            ))),
        }
    }
}

/// The side of a camera within its stereo rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "L" | "left" => Ok(Side::Left),
            "R" | "right" => Ok(Side::Right),
            other => Err(Error::invalid_argument(format!(
                "unknown camera side \"{other}\": use either \"L\" or \"R\""
            ))),
        }
    }
}

/// One sensor's data category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    GlobalFrames,
    RollingFrames,
    Imu,
    GroundTruth,
}

impl Modality {
    pub const ALL: [Modality; 4] = [
        Modality::GlobalFrames,
        Modality::RollingFrames,
        Modality::Imu,
        Modality::GroundTruth,
    ];

    /// Whether samples of this modality can be interpolated.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Modality::Imu | Modality::GroundTruth)
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Modality::GlobalFrames => "global shutter frames",
            Modality::RollingFrames => "rolling shutter frames",
            Modality::Imu => "imu",
            Modality::GroundTruth => "ground truth",
        };
        f.write_str(name)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// The minimum and maximum exposure time in milliseconds a camera was
/// allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposureLimits {
    pub min: f64,
    pub max: f64,
}
