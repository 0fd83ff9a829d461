//! The cameras of a sequence and their photometric calibration.

use crate::{
    error::{Error, Result},
    params::Params,
    types::{ExposureLimits, Shutter, Side},
};
use eyre::{WrapErr, ensure};
use indexmap::IndexMap;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// Number of entries of a complete gamma table, one per 8-bit
/// intensity.
pub const GAMMA_TABLE_LEN: usize = 256;

/// A single camera of one of the stereo rigs.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    pub shutter: Shutter,
    /// Delay between two consecutive rows in milliseconds. Only set for
    /// rolling shutter cameras.
    pub row_delay: Option<f64>,
    pub exposure: Option<ExposureLimits>,
    gamma: Vec<f64>,
    vignette: PathBuf,
}

impl Camera {
    pub fn new(name: impl Into<String>, shutter: Shutter) -> Self {
        Self {
            name: name.into(),
            shutter,
            row_delay: None,
            exposure: None,
            gamma: Vec::new(),
            vignette: PathBuf::new(),
        }
    }

    pub fn with_row_delay(mut self, row_delay: f64) -> Self {
        self.row_delay = Some(row_delay);
        self
    }

    pub fn with_exposure(mut self, exposure: ExposureLimits) -> Self {
        self.exposure = Some(exposure);
        self
    }

    pub fn with_gamma(mut self, gamma: Vec<f64>) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_vignette(mut self, vignette: impl Into<PathBuf>) -> Self {
        self.vignette = vignette.into();
        self
    }

    /// The inverse response curve, indexed by 8-bit intensity.
    pub fn gamma_table(&self) -> &[f64] {
        &self.gamma
    }

    pub fn vignette(&self) -> &Path {
        &self.vignette
    }

    /// Checks if the camera sits on the given side of its rig.
    ///
    /// `cam1` and `cam4` are mounted on the left, `cam2` and `cam3` on
    /// the right.
    pub fn is_on(&self, side: Side) -> bool {
        let names: [&str; 2] = match side {
            Side::Left => ["cam1", "cam4"],
            Side::Right => ["cam2", "cam3"],
        };
        names.contains(&self.name.as_str())
    }
}

/// All cameras of a sequence in configuration order.
#[derive(Debug, Clone, Default)]
pub struct CameraRig {
    cameras: IndexMap<String, Camera>,
}

impl CameraRig {
    pub fn new(cameras: impl IntoIterator<Item = Camera>) -> Self {
        let cameras = cameras
            .into_iter()
            .map(|camera| (camera.name.clone(), camera))
            .collect();
        Self { cameras }
    }

    /// Build the rig from the camera references of `params`, reading
    /// `<params_dir>/<cam>/gamma.txt` and checking that
    /// `<params_dir>/<cam>/vignette.png` exists.
    pub fn load(params: &Params, params_dir: &Path) -> eyre::Result<Self> {
        let mut cameras = Vec::new();

        for (name, reference) in params.cameras() {
            let Some(shutter) = reference.shutter else {
                continue;
            };

            let folder = params_dir.join(name);
            ensure!(
                folder.is_dir(),
                "Could not find folder {}",
                folder.display()
            );

            let gamma_file = folder.join("gamma.txt");
            let vignette = folder.join("vignette.png");
            ensure!(
                gamma_file.is_file(),
                "Could not find file {}",
                gamma_file.display()
            );
            ensure!(
                vignette.is_file(),
                "Could not find file {}",
                vignette.display()
            );

            let gamma = load_gamma(&gamma_file)?;
            if gamma.len() != GAMMA_TABLE_LEN {
                warn!(
                    camera = name,
                    entries = gamma.len(),
                    expected = GAMMA_TABLE_LEN,
                    "gamma table has an unexpected length"
                );
            }

            let mut camera = Camera::new(name, shutter.kind)
                .with_gamma(gamma)
                .with_vignette(vignette);
            camera.exposure = reference.exposure;
            if shutter.kind == Shutter::Rolling {
                camera.row_delay = shutter.speed;
            }

            debug!(camera = name, shutter = %shutter.kind, "loaded camera");
            cameras.push(camera);
        }

        Ok(Self::new(cameras))
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Camera> {
        self.cameras.values()
    }

    /// Position of the camera in configuration order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.cameras.get_index_of(name)
    }

    pub fn get(&self, name: &str) -> Result<&Camera> {
        self.cameras
            .get(name)
            .ok_or_else(|| Error::not_found(format!("unknown camera name: {name}")))
    }

    /// The shutter type of every camera.
    pub fn shutter_types(&self) -> IndexMap<String, Shutter> {
        self.cameras
            .iter()
            .map(|(name, camera)| (name.clone(), camera.shutter))
            .collect()
    }

    /// Find the camera with the given shutter on the given side.
    pub fn lookup_camera(&self, shutter: Shutter, side: Side) -> Result<&Camera> {
        self.iter()
            .find(|camera| camera.shutter == shutter && camera.is_on(side))
            .ok_or_else(|| {
                Error::not_found(format!(
                    "no camera with {shutter} shutter on the {side:?} side"
                ))
            })
    }

    /// The left and right camera of the stereo rig with the given
    /// shutter, if both exist.
    pub fn stereo_pair(&self, shutter: Shutter) -> Option<(&Camera, &Camera)> {
        let left = self.lookup_camera(shutter, Side::Left).ok()?;
        let right = self.lookup_camera(shutter, Side::Right).ok()?;
        Some((left, right))
    }

    /// Row delay of the first rolling shutter camera in milliseconds.
    pub fn rolling_shutter_row_delay(&self) -> Result<f64> {
        self.iter()
            .filter(|camera| camera.shutter == Shutter::Rolling)
            .find_map(|camera| camera.row_delay)
            .ok_or_else(|| Error::not_found("no camera has rolling shutter enabled"))
    }

    /// Exposure limits of the first camera. All cameras of a sequence
    /// share the same limits.
    pub fn exposure_limits(&self) -> Result<ExposureLimits> {
        let camera = self
            .cameras
            .first()
            .map(|(_, camera)| camera)
            .ok_or_else(|| Error::not_found("the sequence has no cameras"))?;

        camera.exposure.ok_or_else(|| {
            Error::not_found(format!("camera {} has no exposure limits", camera.name))
        })
    }

    /// Look up the gamma value of a camera for an 8-bit intensity.
    ///
    /// `input` must lie in `0..=255` and is rounded to the nearest
    /// integer.
    pub fn gamma(&self, name: &str, input: f64) -> Result<f64> {
        let camera = self.get(name)?;

        if !(0.0..=255.0).contains(&input) {
            return Err(Error::invalid_argument(format!(
                "gamma function only defined for inputs from 0 .. 255 and not for {input}"
            )));
        }

        let index = input.round() as usize;
        camera.gamma.get(index).copied().ok_or_else(|| {
            Error::invalid_argument(format!(
                "gamma table of {name} has only {} entries, cannot look up {input}",
                camera.gamma.len()
            ))
        })
    }

    /// Path of the vignette image of a camera.
    pub fn vignette(&self, name: &str) -> Result<&Path> {
        Ok(self.get(name)?.vignette())
    }
}

fn load_gamma(path: &Path) -> eyre::Result<Vec<f64>> {
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read gamma file: {}", path.display()))?;

    contents
        .split_whitespace()
        .enumerate()
        .map(|(index, value)| {
            value.parse::<f64>().wrap_err_with(|| {
                format!(
                    "Invalid gamma value \"{value}\" at position {index} in {}",
                    path.display()
                )
            })
        })
        .collect()
}
