//! Reading the recorded data of a sequence folder.
//!
//! A sequence folder looks like this:
//!
//! ```text
//! <sequence>/
//! ├── data/
//! │   ├── frames.csv
//! │   ├── imu.csv
//! │   └── ground_truth.csv
//! ├── frames/
//! │   └── <cam>/<id>.jpeg
//! └── params/
//!     ├── time.yaml
//!     ├── params.yaml
//!     └── <cam>/{gamma.txt, vignette.png}
//! ```
//!
//! The CSV files are tab separated and start with one header row.

use crate::{
    cameras::{Camera, CameraRig},
    engine::Streams,
    image::ImageResolver,
    sample::{CameraImage, GroundTruthPose, ImuReading, StereoFrame},
    stream::SensorStream,
    types::{Modality, Shutter, Timestamp, WithTimestamp},
};
use eyre::{Result, WrapErr, bail, ensure};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// The files and folders a sequence folder must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceLayout {
    pub root: PathBuf,
    pub frames_dir: PathBuf,
    pub params_dir: PathBuf,
    pub frames_csv: PathBuf,
    pub imu_csv: PathBuf,
    pub groundtruth_csv: PathBuf,
    pub time_yaml: PathBuf,
    pub params_yaml: PathBuf,
}

impl SequenceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let data = root.join("data");
        let params_dir = root.join("params");

        Self {
            frames_dir: root.join("frames"),
            frames_csv: data.join("frames.csv"),
            imu_csv: data.join("imu.csv"),
            groundtruth_csv: data.join("ground_truth.csv"),
            time_yaml: params_dir.join("time.yaml"),
            params_yaml: params_dir.join("params.yaml"),
            params_dir,
            root,
        }
    }

    /// Check that all required folders and files exist.
    pub fn check(root: impl Into<PathBuf>) -> Result<Self> {
        let layout = Self::new(root);

        for folder in [
            layout.root.join("data"),
            layout.frames_dir.clone(),
            layout.params_dir.clone(),
        ] {
            ensure!(
                folder.is_dir(),
                "Could not find folder {}",
                folder.display()
            );
        }

        for file in [
            &layout.frames_csv,
            &layout.imu_csv,
            &layout.groundtruth_csv,
            &layout.time_yaml,
            &layout.params_yaml,
        ] {
            ensure!(file.is_file(), "Could not find file {}", file.display());
        }

        Ok(layout)
    }
}

/// One row of `data/frames.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub stamp: Timestamp,
    pub id: u64,
    /// Exposure time in milliseconds per camera, in configuration
    /// order.
    pub exposures: Vec<f64>,
}

impl FrameRow {
    pub fn exposure(&self, camera_index: usize) -> f64 {
        self.exposures.get(camera_index).copied().unwrap_or(0.0)
    }
}

/// The parsed contents of the three data files, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTables {
    pub frames: Vec<FrameRow>,
    pub imu: Vec<ImuReading>,
    pub groundtruth: Vec<GroundTruthPose>,
}

impl RawTables {
    pub fn load(layout: &SequenceLayout) -> Result<Self> {
        let frames = read_table(&layout.frames_csv, parse_frames)?;
        let imu = read_table(&layout.imu_csv, parse_imu)?;
        let groundtruth = read_table(&layout.groundtruth_csv, parse_groundtruth)?;

        debug!(
            frames = frames.len(),
            imu = imu.len(),
            groundtruth = groundtruth.len(),
            "read data files"
        );

        Ok(Self {
            frames,
            imu,
            groundtruth,
        })
    }
}

fn read_table<T>(path: &Path, parse: impl FnOnce(&str) -> Result<Vec<T>>) -> Result<Vec<T>> {
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read data file: {}", path.display()))?;
    parse(&contents).wrap_err_with(|| format!("Failed to parse data file: {}", path.display()))
}

/// Parse the rows of `frames.csv`: `stamp  id  exposure...`.
pub fn parse_frames(contents: &str) -> Result<Vec<FrameRow>> {
    parse_rows(contents, 2, |values| {
        let id = values[1];
        ensure!(
            id >= 0.0 && id.fract() == 0.0,
            "frame id {id} is not a non-negative integer"
        );

        Ok(FrameRow {
            stamp: values[0],
            id: id as u64,
            exposures: values[2..].to_vec(),
        })
    })
}

/// Parse the rows of `imu.csv`: `stamp  ax ay az  gx gy gz`.
pub fn parse_imu(contents: &str) -> Result<Vec<ImuReading>> {
    parse_rows(contents, 7, |values| {
        Ok(ImuReading {
            stamp: values[0],
            acceleration: [values[1], values[2], values[3]],
            angular_velocity: [values[4], values[5], values[6]],
        })
    })
}

/// Parse the rows of `ground_truth.csv`: `stamp  px py pz  qw qx qy qz`.
pub fn parse_groundtruth(contents: &str) -> Result<Vec<GroundTruthPose>> {
    parse_rows(contents, 8, |values| {
        Ok(GroundTruthPose {
            stamp: values[0],
            position: [values[1], values[2], values[3]],
            orientation: [values[4], values[5], values[6], values[7]],
        })
    })
}

/// Parse a tab separated table of numbers, skipping the header and
/// blank lines.
fn parse_rows<T>(
    contents: &str,
    min_columns: usize,
    mut make_row: impl FnMut(&[f64]) -> Result<T>,
) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    let mut values = Vec::new();

    for (index, line) in contents.lines().enumerate().skip(1) {
        let line_no = index + 1;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        values.clear();
        for field in line.split('\t') {
            let field = field.trim();
            let value: f64 = field
                .parse()
                .wrap_err_with(|| format!("line {line_no}: invalid number \"{field}\""))?;
            values.push(value);
        }

        ensure!(
            values.len() >= min_columns,
            "line {line_no}: expected at least {min_columns} columns, found {}",
            values.len()
        );

        let row = make_row(values.as_slice()).wrap_err_with(|| format!("line {line_no}"))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Assemble the four sensor streams from the parsed tables, assuming
/// that every camera captured every frame.
///
/// Both stereo rigs are triggered together, so their frames are built
/// from the same rows of `frames.csv`. A shutter without a complete
/// stereo rig gets an empty stream.
pub fn build_streams(rig: &CameraRig, raw: &RawTables) -> Result<Streams> {
    assemble(rig, raw, |_, _| true, true)
}

/// Like [build_streams], but asks `images` which cameras captured each
/// frame.
///
/// With `stereosync` only frames captured by both cameras of a rig are
/// kept. Without it a frame is kept when at least one camera captured
/// it, and the dropped side is `None`.
pub fn build_streams_checked(
    rig: &CameraRig,
    raw: &RawTables,
    images: &dyn ImageResolver,
    stereosync: bool,
) -> Result<Streams> {
    assemble(
        rig,
        raw,
        |camera, id| images.is_captured(camera, id),
        stereosync,
    )
}

fn assemble(
    rig: &CameraRig,
    raw: &RawTables,
    captured: impl Fn(&str, u64) -> bool,
    stereosync: bool,
) -> Result<Streams> {
    let global = build_frames(rig, raw, Shutter::Global, &captured, stereosync)?;
    let rolling = build_frames(rig, raw, Shutter::Rolling, &captured, stereosync)?;
    let imu = collect_stream(Modality::Imu, raw.imu.iter().copied())?;
    let groundtruth = collect_stream(Modality::GroundTruth, raw.groundtruth.iter().copied())?;

    Ok(Streams {
        global,
        rolling,
        imu,
        groundtruth,
    })
}

fn build_frames(
    rig: &CameraRig,
    raw: &RawTables,
    shutter: Shutter,
    captured: &impl Fn(&str, u64) -> bool,
    stereosync: bool,
) -> Result<SensorStream<StereoFrame>> {
    let Some((left, right)) = rig.stereo_pair(shutter) else {
        debug!(%shutter, "no stereo rig for shutter, frame stream stays empty");
        return Ok(SensorStream::default());
    };

    let image = |camera: &Camera, row: &FrameRow| {
        captured(&camera.name, row.id).then(|| CameraImage {
            camera: camera.name.clone(),
            exposure_ms: rig
                .index_of(&camera.name)
                .map_or(0.0, |index| row.exposure(index)),
        })
    };

    let mut dropped = 0usize;
    let frames = raw.frames.iter().filter_map(|row| {
        let frame = StereoFrame {
            stamp: row.stamp,
            id: row.id,
            shutter,
            left: image(left, row),
            right: image(right, row),
        };

        let keep = if stereosync {
            frame.is_complete()
        } else {
            frame.left.is_some() || frame.right.is_some()
        };
        if !keep {
            dropped += 1;
        }
        keep.then_some(frame)
    });
    let stream = collect_stream(shutter.modality(), frames)?;

    if dropped > 0 {
        debug!(%shutter, dropped, stereosync, "skipped dropped frames");
    }
    Ok(stream)
}

fn collect_stream<T>(modality: Modality, items: impl IntoIterator<Item = T>) -> Result<SensorStream<T>>
where
    T: WithTimestamp,
{
    let items = items.into_iter();
    let mut stream = SensorStream::with_capacity(items.size_hint().0);

    for item in items {
        let timestamp = item.timestamp();
        ensure!(
            timestamp.is_finite(),
            "{modality} timestamp {timestamp} is not a finite number"
        );

        let previous = stream.last().map(|last: &T| last.timestamp());
        if let Err(item) = stream.try_push(item) {
            bail!(
                "{modality} timestamps must be strictly increasing, but {} follows {}",
                item.timestamp(),
                previous.unwrap_or(f64::NEG_INFINITY)
            );
        }
    }

    debug!(%modality, samples = stream.len(), "built stream");
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAMES: &str = "# time [s]\tframe_id\texp cam1\texp cam2\texp cam3\texp cam4
1.0\t0\t1.5\t1.6\t1.7\t1.8

2.0\t1\t2.5\t2.6\t2.7\t2.8
";

    fn rig() -> CameraRig {
        CameraRig::new([
            Camera::new("cam1", Shutter::Global),
            Camera::new("cam2", Shutter::Global),
            Camera::new("cam3", Shutter::Rolling).with_row_delay(0.03),
            Camera::new("cam4", Shutter::Rolling).with_row_delay(0.03),
        ])
    }

    #[test]
    fn test_parse_frames() {
        let rows = parse_frames(FRAMES).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].stamp, 2.0);
        assert_eq!(rows[1].id, 1);
        assert_eq!(rows[1].exposures, [2.5, 2.6, 2.7, 2.8]);
        assert_eq!(rows[1].exposure(7), 0.0);
    }

    #[test]
    fn test_parse_imu_and_groundtruth() {
        let imu = parse_imu("header\n0.5\t1\t2\t3\t4\t5\t6\n").unwrap();
        assert_eq!(imu[0].acceleration, [1.0, 2.0, 3.0]);
        assert_eq!(imu[0].angular_velocity, [4.0, 5.0, 6.0]);

        let poses = parse_groundtruth("header\r\n0.5\t1\t2\t3\t1\t0\t0\t0\r\n").unwrap();
        assert_eq!(poses[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(poses[0].orientation, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_parse_errors_carry_line() {
        let err = parse_imu("header\n0.5\t1\t2\t3\t4\t5\t6\n0.6\t1\tx\t3\t4\t5\t6\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 3"));

        let err = parse_groundtruth("header\n0.5\t1\t2\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        let err = parse_frames("header\n0.5\t1.5\n").unwrap_err();
        assert!(format!("{err:#}").contains("frame id"));
    }

    #[test]
    fn test_build_streams_assigns_cameras() {
        let raw = RawTables {
            frames: parse_frames(FRAMES).unwrap(),
            ..RawTables::default()
        };
        let streams = build_streams(&rig(), &raw).unwrap();

        let global = streams.global.get(0).unwrap();
        let (left, right) = (global.left.as_ref().unwrap(), global.right.as_ref().unwrap());
        assert_eq!(left.camera, "cam1");
        assert_eq!(left.exposure_ms, 1.5);
        assert_eq!(right.camera, "cam2");

        let rolling = streams.rolling.get(1).unwrap();
        let (left, right) = (rolling.left.as_ref().unwrap(), rolling.right.as_ref().unwrap());
        assert_eq!(rolling.shutter, Shutter::Rolling);
        assert_eq!(left.camera, "cam4");
        assert_eq!(left.exposure_ms, 2.8);
        assert_eq!(right.camera, "cam3");
        assert_eq!(right.exposure_ms, 2.7);

        assert!(streams.imu.is_empty());
    }

    #[test]
    fn test_build_streams_without_rig() {
        let rig = CameraRig::new([
            Camera::new("cam1", Shutter::Global),
            Camera::new("cam2", Shutter::Global),
        ]);
        let raw = RawTables {
            frames: parse_frames(FRAMES).unwrap(),
            ..RawTables::default()
        };
        let streams = build_streams(&rig, &raw).unwrap();
        assert_eq!(streams.global.len(), 2);
        assert!(streams.rolling.is_empty());
    }

    #[test]
    fn test_build_streams_rejects_unordered_rows() {
        let raw = RawTables {
            imu: parse_imu("h\n2.0\t0\t0\t0\t0\t0\t0\n1.0\t0\t0\t0\t0\t0\t0\n").unwrap(),
            ..RawTables::default()
        };
        let err = build_streams(&rig(), &raw).unwrap_err();
        assert!(err.to_string().contains("imu"));
    }

    #[test]
    fn test_build_streams_rejects_nan_stamp() {
        let raw = RawTables {
            imu: parse_imu("h\n0.5\t0\t0\t0\t0\t0\t0\nnan\t0\t0\t0\t0\t0\t0\n1.5\t0\t0\t0\t0\t0\t0\n")
                .unwrap(),
            ..RawTables::default()
        };
        let err = build_streams(&rig(), &raw).unwrap_err();
        assert!(err.to_string().contains("not a finite number"));
    }

    #[test]
    fn test_build_streams_rejects_leading_nan_stamp() {
        let raw = RawTables {
            groundtruth: parse_groundtruth("h\nNaN\t0\t0\t0\t1\t0\t0\t0\n").unwrap(),
            ..RawTables::default()
        };
        let err = build_streams(&rig(), &raw).unwrap_err();
        assert!(err.to_string().contains("ground"));
    }

    /// Every image is captured except the listed ones.
    struct Drops(&'static [(&'static str, u64)]);

    impl ImageResolver for Drops {
        fn resolve(&self, camera: &str, id: u64) -> PathBuf {
            PathBuf::from(camera).join(id.to_string())
        }

        fn is_captured(&self, camera: &str, id: u64) -> bool {
            !self.0.iter().any(|&(name, drop)| name == camera && drop == id)
        }
    }

    const THREE_FRAMES: &str = "h
1.0\t0\t1\t1\t1\t1
2.0\t1\t1\t1\t1\t1
3.0\t2\t1\t1\t1\t1
";

    #[test]
    fn test_stereosync_keeps_complete_frames() {
        let raw = RawTables {
            frames: parse_frames(THREE_FRAMES).unwrap(),
            ..RawTables::default()
        };
        let drops = Drops(&[("cam1", 1), ("cam3", 2), ("cam4", 2)]);
        let streams = build_streams_checked(&rig(), &raw, &drops, true).unwrap();

        let ids = |stream: &SensorStream<StereoFrame>| stream.iter().map(|f| f.id).collect::<Vec<_>>();
        assert_eq!(ids(&streams.global), [0, 2]);
        assert_eq!(ids(&streams.rolling), [0, 1]);
        assert!(streams.global.iter().all(StereoFrame::is_complete));
    }

    #[test]
    fn test_without_stereosync_dropped_side_is_none() {
        let raw = RawTables {
            frames: parse_frames(THREE_FRAMES).unwrap(),
            ..RawTables::default()
        };
        let drops = Drops(&[("cam1", 1), ("cam3", 2), ("cam4", 2)]);
        let streams = build_streams_checked(&rig(), &raw, &drops, false).unwrap();

        assert_eq!(streams.global.len(), 3);
        let frame = streams.global.get(1).unwrap();
        assert!(frame.left.is_none());
        assert_eq!(frame.right.as_ref().unwrap().camera, "cam2");

        // both rolling cameras dropped frame 2
        assert_eq!(streams.rolling.len(), 2);
        assert_eq!(streams.rolling.last().unwrap().id, 1);
    }
}
