use shuttum_core::{
    Camera, CameraRig, ExposureLimits, GroundTruthPose, ImuReading, Sequence, Shutter,
    loader::{FrameRow, RawTables},
    params::TimeConfig,
};
use std::{fmt::Write as _, fs, path::Path};
use tempfile::TempDir;

pub const ROW_DELAY: f64 = 0.0294;

pub const EXPOSURE: ExposureLimits = ExposureLimits {
    min: 0.02,
    max: 20.0,
};

pub const CAMERAS: [&str; 4] = ["cam1", "cam2", "cam3", "cam4"];

pub fn imu_reading(stamp: f64) -> ImuReading {
    ImuReading {
        stamp,
        acceleration: [stamp, 2.0 * stamp, 9.81],
        angular_velocity: [0.0, 0.0, stamp],
    }
}

pub fn pose(stamp: f64) -> GroundTruthPose {
    GroundTruthPose {
        stamp,
        position: [stamp, 0.0, 1.0],
        orientation: [1.0, 0.0, 0.0, 0.0],
    }
}

/// Exposure of camera `index` at frame `id`, distinct per camera.
pub fn exposure(id: u64, index: usize) -> f64 {
    id as f64 + (index as f64 + 1.0) / 10.0
}

/// Builds sequences in memory or as folders on disk.
///
/// By default `cam1` and `cam2` use global shutter and `cam3` and
/// `cam4` rolling shutter.
#[derive(Debug, Clone, Default)]
pub struct SequenceBuilder {
    frames: Vec<f64>,
    imu: Vec<f64>,
    groundtruth: Vec<f64>,
    swapped: bool,
    dropped: Vec<(&'static str, u64)>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(mut self, stamps: &[f64]) -> Self {
        self.frames.extend_from_slice(stamps);
        self
    }

    pub fn imu(mut self, stamps: &[f64]) -> Self {
        self.imu.extend_from_slice(stamps);
        self
    }

    pub fn groundtruth(mut self, stamps: &[f64]) -> Self {
        self.groundtruth.extend_from_slice(stamps);
        self
    }

    /// Let `cam1` and `cam2` use rolling and `cam3` and `cam4` global
    /// shutter.
    #[allow(dead_code)]
    pub fn swapped_shutters(mut self) -> Self {
        self.swapped = true;
        self
    }

    /// Leave out the image of `camera` for frame `id` when writing the
    /// sequence to disk.
    #[allow(dead_code)]
    pub fn drop_image(mut self, camera: &'static str, id: u64) -> Self {
        self.dropped.push((camera, id));
        self
    }

    fn shutter_of(&self, index: usize) -> Shutter {
        match (index < 2, self.swapped) {
            (true, false) | (false, true) => Shutter::Global,
            _ => Shutter::Rolling,
        }
    }

    pub fn rig(&self) -> CameraRig {
        CameraRig::new(CAMERAS.iter().enumerate().map(|(index, name)| {
            let camera = Camera::new(*name, self.shutter_of(index)).with_exposure(EXPOSURE);
            match camera.shutter {
                Shutter::Rolling => camera.with_row_delay(ROW_DELAY),
                Shutter::Global => camera,
            }
        }))
    }

    pub fn tables(&self) -> RawTables {
        RawTables {
            frames: self
                .frames
                .iter()
                .enumerate()
                .map(|(id, &stamp)| FrameRow {
                    stamp,
                    id: id as u64,
                    exposures: (0..CAMERAS.len())
                        .map(|index| exposure(id as u64, index))
                        .collect(),
                })
                .collect(),
            imu: self.imu.iter().copied().map(imu_reading).collect(),
            groundtruth: self.groundtruth.iter().copied().map(pose).collect(),
        }
    }

    pub fn time(&self) -> TimeConfig {
        let all = || {
            self.frames
                .iter()
                .chain(&self.imu)
                .chain(&self.groundtruth)
                .copied()
        };
        let start = all().reduce(f64::min).unwrap_or(0.0);
        let end = all().reduce(f64::max).unwrap_or(0.0);

        TimeConfig {
            start,
            end,
            duration: end - start,
        }
    }

    pub fn build(&self) -> Sequence {
        Sequence::from_tables("sequence", self.time(), self.rig(), self.tables()).unwrap()
    }

    /// Write the sequence as a folder below `root`.
    pub fn write_to(&self, root: &Path) -> eyre::Result<()> {
        let data = root.join("data");
        let params = root.join("params");
        fs::create_dir_all(&data)?;
        fs::create_dir_all(&params)?;

        let tables = self.tables();

        let mut frames = String::from("# time [s]\tframe id\tcam1 [ms]\tcam2 [ms]\tcam3 [ms]\tcam4 [ms]\n");
        for row in &tables.frames {
            write!(frames, "{}\t{}", row.stamp, row.id)?;
            for exposure in &row.exposures {
                write!(frames, "\t{exposure}")?;
            }
            frames.push('\n');
        }
        fs::write(data.join("frames.csv"), frames)?;

        let mut imu = String::from("# time [s]\tax\tay\taz\tgx\tgy\tgz\n");
        for reading in &tables.imu {
            let [ax, ay, az] = reading.acceleration;
            let [gx, gy, gz] = reading.angular_velocity;
            writeln!(imu, "{}\t{ax}\t{ay}\t{az}\t{gx}\t{gy}\t{gz}", reading.stamp)?;
        }
        fs::write(data.join("imu.csv"), imu)?;

        let mut groundtruth = String::from("# time [s]\tpx\tpy\tpz\tqw\tqx\tqy\tqz\n");
        for pose in &tables.groundtruth {
            let [px, py, pz] = pose.position;
            let [qw, qx, qy, qz] = pose.orientation;
            writeln!(
                groundtruth,
                "{}\t{px}\t{py}\t{pz}\t{qw}\t{qx}\t{qy}\t{qz}",
                pose.stamp
            )?;
        }
        fs::write(data.join("ground_truth.csv"), groundtruth)?;

        let time = self.time();
        fs::write(
            params.join("time.yaml"),
            format!(
                "time:\n  start: {:?}\n  end: {:?}\n  duration: {:?}\n",
                time.start, time.end, time.duration
            ),
        )?;

        let mut yaml = String::from("world: {}\nimu:\n  transform: identity\nmarker:\n  transform: identity\n");
        let gamma = (0..256).map(|i| format!("{}", i as f64 / 255.0)).collect::<Vec<_>>().join(" ");
        for (index, name) in CAMERAS.iter().enumerate() {
            // global cameras carry a speed too, calibration sequences may
            // switch them to rolling shutter
            let shutter = format!(
                "{{ type: {}, speed: {ROW_DELAY} }}",
                self.shutter_of(index)
            );
            write!(
                yaml,
                "{name}:\n  transform: identity\n  shutter: {shutter}\n  exposure: {{ min: {}, max: {} }}\n",
                EXPOSURE.min, EXPOSURE.max
            )?;

            let folder = params.join(name);
            fs::create_dir_all(&folder)?;
            fs::write(folder.join("gamma.txt"), &gamma)?;
            fs::write(folder.join("vignette.png"), b"")?;

            let images = root.join("frames").join(name);
            fs::create_dir_all(&images)?;
            for row in &tables.frames {
                if !self.dropped.contains(&(*name, row.id)) {
                    fs::write(images.join(format!("{:05}.jpeg", row.id)), b"")?;
                }
            }
        }
        fs::write(params.join("params.yaml"), yaml)?;

        Ok(())
    }

    /// Write the sequence into a fresh temporary folder.
    #[allow(dead_code)]
    pub fn write_temp(&self) -> eyre::Result<TempDir> {
        let dir = tempfile::tempdir()?;
        self.write_to(dir.path())?;
        Ok(dir)
    }
}

/// frames = {0.0, 1.0, 2.0}, imu = {0.5, 1.5}, groundtruth = {1.0}
#[allow(dead_code)]
pub fn scenario() -> SequenceBuilder {
    SequenceBuilder::new()
        .frames(&[0.0, 1.0, 2.0])
        .imu(&[0.5, 1.5])
        .groundtruth(&[1.0])
}

/// Collect the stamps of a range of records.
#[allow(dead_code)]
pub fn stamps<'a>(records: impl Iterator<Item = shuttum_core::Record<'a>>) -> Vec<f64> {
    records.map(|record| record.stamp).collect()
}
