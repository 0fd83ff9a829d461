//! This library gives time-synchronized access to one recorded
//! sequence of a dual-shutter stereo dataset: a global shutter and a
//! rolling shutter stereo rig, an IMU and motion-capture ground truth,
//! each sampled at its own rate.
//!
//! All timestamps of all sensors are merged into one timeline. Queries
//! at a timestamp return a [Record] with whatever each sensor recorded
//! at that instant, or a sample picked by a [MatchPolicy].
//!
//! # Usage
//!
//! ```no_run
//! use shuttum_core::{MatchPolicy, Sequence, Shutter, ShutterSelector};
//!
//! # fn main() -> eyre::Result<()> {
//! let sequence = Sequence::open("path/to/sequence")?;
//! println!("{sequence} lasts {} s", sequence.duration());
//!
//! // Everything recorded between two timestamps, both included
//! for record in sequence.range(Some(5.0), Some(45.0)) {
//!     if let Some(frame) = record.global {
//!         println!("{}: global frame {}", record.stamp, frame.id);
//!     }
//! }
//!
//! // Walk one sensor and look up the others on demand
//! for frame in sequence.frames(Shutter::Rolling) {
//!     let imu = frame.imu(MatchPolicy::Linear)?;
//!     println!("frame {} at {}: {:?}", frame.id, frame.stamp(), imu);
//! }
//!
//! // Frames of both rigs side by side
//! let selector: ShutterSelector = "both".parse()?;
//! if let Some(pairs) = sequence.cameras(selector).both() {
//!     for pair in pairs {
//!         println!("{}: {}", pair.stamp, pair.global.is_some());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cameras;
mod config;
pub mod engine;
mod error;
pub mod image;
pub mod loader;
pub mod observation;
pub mod params;
mod record;
pub mod sample;
mod sequence;
pub mod stream;
pub mod timeline;
mod types;

pub use cameras::{Camera, CameraRig};
pub use config::{LoadOptions, MatchPolicy, TimeSlice};
pub use engine::{QueryEngine, Range, Streams};
pub use error::{Error, Result};
pub use image::{FrameDirectory, ImageResolver};
pub use observation::{CameraView, Observation, Observations, StereoPair, StereoPairs};
pub use record::Record;
pub use sample::{CameraImage, GroundTruthPose, ImuReading, Interpolate, StereoFrame};
pub use sequence::{RESOLUTION, Sequence};
pub use stream::SensorStream;
pub use timeline::Timeline;
pub use types::*;
