//! Sensor samples of the four modalities.

use crate::types::{Shutter, Side, Timestamp, WithTimestamp};
use serde::Serialize;

/// One camera's image within a stereo frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraImage {
    /// Reference name of the camera, e.g. `cam1`.
    pub camera: String,
    /// Exposure time in milliseconds.
    pub exposure_ms: f64,
}

/// A pair of images captured by one stereo rig at the same trigger.
///
/// A camera that dropped the trigger has no image on its side. Frames
/// where both cameras dropped are never recorded. The pixels are not
/// loaded. Use an
/// [ImageResolver](crate::image::ImageResolver) to find the image
/// files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StereoFrame {
    pub stamp: Timestamp,
    /// The frame number shared by all cameras at this trigger.
    pub id: u64,
    pub shutter: Shutter,
    pub left: Option<CameraImage>,
    pub right: Option<CameraImage>,
}

impl StereoFrame {
    pub fn image(&self, side: Side) -> Option<&CameraImage> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    /// Whether both cameras captured this frame.
    pub fn is_complete(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

impl WithTimestamp for StereoFrame {
    fn timestamp(&self) -> Timestamp {
        self.stamp
    }
}

/// A reading of the inertial measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImuReading {
    pub stamp: Timestamp,
    /// Linear acceleration in m/s².
    pub acceleration: [f64; 3],
    /// Angular velocity in rad/s.
    pub angular_velocity: [f64; 3],
}

impl WithTimestamp for ImuReading {
    fn timestamp(&self) -> Timestamp {
        self.stamp
    }
}

/// A pose reported by the motion capture system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundTruthPose {
    pub stamp: Timestamp,
    /// Position in meters.
    pub position: [f64; 3],
    /// Unit quaternion in `w, x, y, z` order.
    pub orientation: [f64; 4],
}

impl WithTimestamp for GroundTruthPose {
    fn timestamp(&self) -> Timestamp {
        self.stamp
    }
}

/// Samples of continuously-valued modalities that can be synthesized
/// between two recorded neighbours.
pub trait Interpolate: WithTimestamp + Clone {
    /// Builds a sample at `stamp`, where `before.timestamp() < stamp <
    /// after.timestamp()`.
    fn interpolate(before: &Self, after: &Self, stamp: Timestamp) -> Self;
}

impl Interpolate for ImuReading {
    fn interpolate(before: &Self, after: &Self, stamp: Timestamp) -> Self {
        let t = fraction(before.stamp, after.stamp, stamp);
        Self {
            stamp,
            acceleration: lerp3(&before.acceleration, &after.acceleration, t),
            angular_velocity: lerp3(&before.angular_velocity, &after.angular_velocity, t),
        }
    }
}

impl Interpolate for GroundTruthPose {
    /// Positions are interpolated linearly. Orientations use normalized
    /// linear interpolation along the shorter arc.
    fn interpolate(before: &Self, after: &Self, stamp: Timestamp) -> Self {
        let t = fraction(before.stamp, after.stamp, stamp);

        let dot: f64 = before
            .orientation
            .iter()
            .zip(&after.orientation)
            .map(|(a, b)| a * b)
            .sum();
        let sign = if dot < 0.0 { -1.0 } else { 1.0 };

        let mut orientation = [0.0; 4];
        for (i, q) in orientation.iter_mut().enumerate() {
            let a = before.orientation[i];
            let b = after.orientation[i] * sign;
            *q = t.mul_add(b - a, a);
        }
        let norm = orientation.iter().map(|q| q * q).sum::<f64>().sqrt();
        if norm > 0.0 {
            orientation.iter_mut().for_each(|q| *q /= norm);
        }

        Self {
            stamp,
            position: lerp3(&before.position, &after.position, t),
            orientation,
        }
    }
}

fn fraction(t0: Timestamp, t1: Timestamp, t: Timestamp) -> f64 {
    (t - t0) / (t1 - t0)
}

fn lerp3(a: &[f64; 3], b: &[f64; 3], t: f64) -> [f64; 3] {
    [
        t.mul_add(b[0] - a[0], a[0]),
        t.mul_add(b[1] - a[1], a[1]),
        t.mul_add(b[2] - a[2], a[2]),
    ]
}
