//! Locating the image files of stereo frames.

use crate::{sample::StereoFrame, types::Side};
use std::path::{Path, PathBuf};

/// Resolves a camera name and a frame id to the location of the image.
///
/// The query engine never resolves images. Callers decide when to touch
/// the files.
pub trait ImageResolver {
    fn resolve(&self, camera: &str, id: u64) -> PathBuf;

    /// Location of one side of a stereo frame, or `None` if that camera
    /// dropped the frame.
    fn resolve_frame(&self, frame: &StereoFrame, side: Side) -> Option<PathBuf> {
        let image = frame.image(side)?;
        Some(self.resolve(&image.camera, frame.id))
    }

    /// Whether the camera stored an image for the frame.
    fn is_captured(&self, camera: &str, id: u64) -> bool {
        self.resolve(camera, id).is_file()
    }
}

/// The `frames/<camera>/<id>.jpeg` layout of a sequence folder, with
/// ids zero-padded to five digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDirectory {
    root: PathBuf,
}

impl FrameDirectory {
    pub const EXTENSION: &'static str = "jpeg";

    /// Create a resolver for the sequence folder at `sequence`.
    pub fn new(sequence: impl AsRef<Path>) -> Self {
        Self {
            root: sequence.as_ref().join("frames"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageResolver for FrameDirectory {
    fn resolve(&self, camera: &str, id: u64) -> PathBuf {
        self.root
            .join(camera)
            .join(format!("{id:05}.{}", Self::EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sample::CameraImage, types::Shutter};

    #[test]
    fn test_frame_directory_layout() {
        let frames = FrameDirectory::new("/data/seq01");
        assert_eq!(
            frames.resolve("cam1", 42),
            Path::new("/data/seq01/frames/cam1/00042.jpeg")
        );
        assert_eq!(
            frames.resolve("cam3", 123456),
            Path::new("/data/seq01/frames/cam3/123456.jpeg")
        );
    }

    #[test]
    fn test_resolve_frame_side() {
        let frame = StereoFrame {
            stamp: 1.0,
            id: 7,
            shutter: Shutter::Global,
            left: None,
            right: Some(CameraImage {
                camera: "cam2".into(),
                exposure_ms: 1.0,
            }),
        };
        let frames = FrameDirectory::new("seq");
        assert_eq!(
            frames.resolve_frame(&frame, Side::Right).unwrap(),
            Path::new("seq/frames/cam2/00007.jpeg")
        );
        assert_eq!(frames.resolve_frame(&frame, Side::Left), None);
    }

    #[test]
    fn test_is_captured_checks_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let frames = FrameDirectory::new(dir.path());
        std::fs::create_dir_all(frames.root().join("cam1")).unwrap();
        std::fs::write(frames.resolve("cam1", 3), b"").unwrap();

        assert!(frames.is_captured("cam1", 3));
        assert!(!frames.is_captured("cam1", 4));
        assert!(!frames.is_captured("cam2", 3));
    }
}
