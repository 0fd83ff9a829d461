//! Parsing and validation of the sequence parameter files
//! `params/time.yaml` and `params/params.yaml`.

use crate::types::{ExposureLimits, Shutter, Timestamp};
use eyre::{Result, WrapErr, bail, ensure};
use indexmap::IndexMap;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::debug;

/// The reference that only has to be present in `params.yaml`.
pub const WORLD: &str = "world";

/// Record-level time bounds from `params/time.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TimeConfig {
    /// Unix timestamp of the first recorded instant in seconds.
    pub start: Timestamp,
    /// Unix timestamp of the last recorded instant in seconds.
    pub end: Timestamp,
    /// `end - start` in seconds.
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
struct TimeFile {
    time: TimeConfig,
}

impl TimeConfig {
    /// Load the time bounds from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read time file: {}", path.display()))?;

        Self::parse(&contents)
            .wrap_err_with(|| format!("Failed to parse time file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let file: TimeFile = serde_yaml::from_str(contents)?;
        let time = file.time;

        ensure!(
            time.end >= time.start,
            "time.end ({}) lies before time.start ({})",
            time.end,
            time.start
        );

        Ok(time)
    }
}

/// The parameters of a single reference frame in `params.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceConfig {
    /// The pose of the reference. Only its presence is checked.
    #[serde(default)]
    pub transform: Option<serde_yaml::Value>,

    /// Present if and only if the reference is a camera.
    #[serde(default)]
    pub shutter: Option<ShutterConfig>,

    /// Exposure limits of a camera.
    #[serde(default)]
    pub exposure: Option<ExposureLimits>,
}

impl ReferenceConfig {
    pub fn is_camera(&self) -> bool {
        self.shutter.is_some()
    }
}

/// The shutter of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ShutterConfig {
    #[serde(rename = "type")]
    pub kind: Shutter,

    /// Delay between the exposure of two consecutive rows in
    /// milliseconds. Required for rolling shutter cameras.
    #[serde(default)]
    pub speed: Option<f64>,
}

/// All references of `params.yaml`, in file order.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub references: IndexMap<String, ReferenceConfig>,
}

impl Params {
    /// Load the references from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read params file: {}", path.display()))?;

        Self::parse(&contents)
            .wrap_err_with(|| format!("Failed to parse params file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let raw: IndexMap<String, serde_yaml::Value> = serde_yaml::from_str(contents)?;

        ensure!(
            raw.contains_key(WORLD),
            "Could not find the \"{WORLD}\" reference"
        );

        let mut references = IndexMap::with_capacity(raw.len());
        for (name, value) in raw {
            if name == WORLD {
                continue;
            }

            let reference: ReferenceConfig = serde_yaml::from_value(value)
                .wrap_err_with(|| format!("Invalid reference \"{name}\""))?;
            references.insert(name, reference);
        }

        let params = Self { references };
        params.validate()?;

        debug!(
            references = params.references.len(),
            cameras = params.cameras().count(),
            "parsed params"
        );

        Ok(params)
    }

    /// Validate the references.
    fn validate(&self) -> Result<()> {
        for (name, reference) in &self.references {
            ensure!(
                reference.transform.is_some(),
                "Could not find transform in reference \"{name}\""
            );

            let Some(shutter) = &reference.shutter else {
                continue;
            };

            if shutter.kind == Shutter::Rolling {
                match shutter.speed {
                    Some(speed) if speed >= 0.0 => {}
                    Some(speed) => bail!("Camera \"{name}\" has a negative row delay of {speed}"),
                    None => bail!("Rolling shutter camera \"{name}\" has no shutter.speed"),
                }
            }

            if let Some(exposure) = &reference.exposure {
                ensure!(
                    exposure.min <= exposure.max,
                    "Camera \"{name}\" has exposure.min above exposure.max"
                );
            }
        }

        Ok(())
    }

    /// The references that are cameras, in file order.
    pub fn cameras(&self) -> impl Iterator<Item = (&str, &ReferenceConfig)> {
        self.references
            .iter()
            .filter(|(_, reference)| reference.is_camera())
            .map(|(name, reference)| (name.as_str(), reference))
    }

    /// Force the shutter layout of calibration sequences, where `cam1`
    /// and `cam2` use global and `cam3` and `cam4` rolling shutter.
    pub fn apply_calibration_layout(&mut self) -> Result<()> {
        const LAYOUT: [(&str, Shutter); 4] = [
            ("cam1", Shutter::Global),
            ("cam2", Shutter::Global),
            ("cam3", Shutter::Rolling),
            ("cam4", Shutter::Rolling),
        ];

        for (name, kind) in LAYOUT {
            let shutter = self
                .references
                .get_mut(name)
                .and_then(|reference| reference.shutter.as_mut());
            let Some(shutter) = shutter else {
                bail!("Calibration sequences require camera \"{name}\"");
            };
            shutter.kind = kind;
        }

        self.validate()
    }
}
