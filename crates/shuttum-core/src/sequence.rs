use crate::{
    cameras::{Camera, CameraRig},
    config::{LoadOptions, MatchPolicy, TimeSlice},
    engine::{QueryEngine, Range, Streams},
    error::Result,
    image::{FrameDirectory, ImageResolver},
    loader::{self, RawTables, SequenceLayout},
    observation::{CameraView, Observations, StereoPairs},
    params::{Params, TimeConfig},
    record::Record,
    sample::{GroundTruthPose, ImuReading, StereoFrame},
    timeline::Timeline,
    types::{ExposureLimits, Resolution, Shutter, ShutterSelector, Side, Timestamp},
};
use chrono::{DateTime, Utc};
use eyre::WrapErr;
use indexmap::IndexMap;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use tracing::info;

/// Nominal image size of all cameras.
pub const RESOLUTION: Resolution = Resolution {
    width: 1280,
    height: 1024,
};

/// One recorded sequence, loaded and ready for queries.
///
/// All data is read when the sequence is opened. Afterwards the
/// sequence is immutable and can be shared between threads.
#[derive(Debug, Clone)]
pub struct Sequence {
    path: PathBuf,
    time: TimeConfig,
    cameras: CameraRig,
    raw: RawTables,
    engine: QueryEngine,
    images: FrameDirectory,
    stereosync: bool,
}

impl Sequence {
    /// Open the sequence folder at `path`.
    pub fn open(path: impl AsRef<Path>) -> eyre::Result<Self> {
        Self::open_with(path, LoadOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: LoadOptions) -> eyre::Result<Self> {
        let path = path.as_ref();
        let layout = SequenceLayout::check(path)?;

        let time = TimeConfig::load(&layout.time_yaml)?;
        let mut params = Params::load(&layout.params_yaml)?;
        if options.calibration {
            params
                .apply_calibration_layout()
                .wrap_err_with(|| format!("Invalid calibration sequence {}", path.display()))?;
        }

        let cameras = CameraRig::load(&params, &layout.params_dir)?;
        let raw = RawTables::load(&layout)?;

        let images = FrameDirectory::new(path);
        let streams =
            loader::build_streams_checked(&cameras, &raw, &images, options.stereosync)
                .wrap_err_with(|| format!("Invalid data in sequence {}", path.display()))?;

        Ok(Self::assemble(
            path.to_path_buf(),
            time,
            cameras,
            raw,
            streams,
            options.stereosync,
        ))
    }

    /// Build a sequence from already parsed parts. `path` is only used
    /// to locate images, and every camera is assumed to have captured
    /// every frame.
    pub fn from_tables(
        path: impl Into<PathBuf>,
        time: TimeConfig,
        cameras: CameraRig,
        raw: RawTables,
    ) -> eyre::Result<Self> {
        let path = path.into();
        let streams = loader::build_streams(&cameras, &raw)
            .wrap_err_with(|| format!("Invalid data in sequence {}", path.display()))?;

        Ok(Self::assemble(path, time, cameras, raw, streams, true))
    }

    fn assemble(
        path: PathBuf,
        time: TimeConfig,
        cameras: CameraRig,
        raw: RawTables,
        streams: Streams,
        stereosync: bool,
    ) -> Self {
        let images = FrameDirectory::new(&path);
        let sequence = Self {
            path,
            time,
            cameras,
            raw,
            engine: QueryEngine::new(streams),
            images,
            stereosync,
        };

        info!(
            sequence = %sequence,
            cameras = sequence.cameras.len(),
            stamps = sequence.times().len(),
            duration = sequence.duration(),
            stereosync,
            "loaded sequence"
        );

        sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The name of the sequence folder.
    pub fn name(&self) -> String {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.path.display().to_string(),
        }
    }

    /// The parsed contents of the data files.
    pub fn raw(&self) -> &RawTables {
        &self.raw
    }

    /// Whether the frame streams only hold frames that both cameras of
    /// a rig captured.
    pub fn stereosync(&self) -> bool {
        self.stereosync
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn streams(&self) -> &Streams {
        self.engine.streams()
    }

    /// The sorted union of all recorded timestamps.
    pub fn times(&self) -> &Timeline {
        self.engine.timeline()
    }

    pub fn start(&self) -> Timestamp {
        self.time.start
    }

    pub fn end(&self) -> Timestamp {
        self.time.end
    }

    /// Length of the record in seconds.
    pub fn duration(&self) -> f64 {
        self.time.duration
    }

    /// The start of the record as a calendar time, or `None` if it is
    /// not representable.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let secs = self.time.start.floor();
        let nanos = ((self.time.start - secs) * 1e9).round().min(999_999_999.0) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    }

    pub fn resolution(&self) -> Resolution {
        RESOLUTION
    }

    /// The exposure limits shared by all cameras, taken from the first
    /// configured camera.
    pub fn exposure_limits(&self) -> Result<ExposureLimits> {
        self.cameras.exposure_limits()
    }

    /// Delay between two consecutive rows of the rolling shutter
    /// cameras in milliseconds.
    pub fn rolling_shutter_row_delay(&self) -> Result<f64> {
        self.cameras.rolling_shutter_row_delay()
    }

    pub fn camera_rig(&self) -> &CameraRig {
        &self.cameras
    }

    pub fn shutter_types(&self) -> IndexMap<String, Shutter> {
        self.cameras.shutter_types()
    }

    pub fn lookup_camera(&self, shutter: Shutter, side: Side) -> Result<&Camera> {
        self.cameras.lookup_camera(shutter, side)
    }

    pub fn gamma(&self, camera: &str, input: f64) -> Result<f64> {
        self.cameras.gamma(camera, input)
    }

    pub fn vignette(&self, camera: &str) -> Result<&Path> {
        self.cameras.vignette(camera)
    }

    pub fn images(&self) -> &FrameDirectory {
        &self.images
    }

    /// Location of one image of a stereo frame, or `None` if that
    /// camera dropped the frame.
    pub fn image_path(&self, frame: &StereoFrame, side: Side) -> Option<PathBuf> {
        self.images.resolve_frame(frame, side)
    }

    /// Everything recorded at exactly `stamp`. Never fails; modalities
    /// without a sample at `stamp` are absent.
    pub fn point(&self, stamp: Timestamp) -> Record<'_> {
        self.engine.point(stamp)
    }

    /// Resolve all modalities at `stamp` with the given policy.
    pub fn lookup(&self, stamp: Timestamp, policy: MatchPolicy) -> Result<Record<'_>> {
        self.engine.resolve(stamp, policy)
    }

    /// The records of all recorded stamps in `start..=stop`. Open bounds
    /// extend to the first or last stamp.
    pub fn range(&self, start: Option<Timestamp>, stop: Option<Timestamp>) -> Range<'_> {
        self.engine.range(start, stop)
    }

    /// Like [range](Self::range). Fails if the slice has a step.
    pub fn slice(&self, slice: impl Into<TimeSlice>) -> Result<Range<'_>> {
        self.engine.slice(slice.into())
    }

    /// Walk the frames of one stereo rig.
    pub fn frames(&self, shutter: Shutter) -> Observations<'_, StereoFrame> {
        Observations::new(self.streams().frames(shutter).as_slice(), &self.engine)
    }

    /// Walk the frames of the selected rigs.
    pub fn cameras(&self, selector: ShutterSelector) -> CameraView<'_> {
        match selector {
            ShutterSelector::Global => CameraView::Global(self.frames(Shutter::Global)),
            ShutterSelector::Rolling => CameraView::Rolling(self.frames(Shutter::Rolling)),
            ShutterSelector::Both => CameraView::Both(self.stereo_pairs()),
        }
    }

    /// Walk the frames of both rigs, joined by timestamp.
    pub fn stereo_pairs(&self) -> StereoPairs<'_> {
        StereoPairs::new(&self.engine)
    }

    pub fn imu(&self) -> Observations<'_, ImuReading> {
        Observations::new(self.streams().imu.as_slice(), &self.engine)
    }

    pub fn groundtruth(&self) -> Observations<'_, GroundTruthPose> {
        Observations::new(self.streams().groundtruth.as_slice(), &self.engine)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sequence ({})", self.name())
    }
}
