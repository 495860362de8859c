use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::models::DetectionSet;

/// Anything that can find labeled components in an image.
///
/// Implementations may fail; the error is handed to the caller untouched.
/// An image with no components yields an empty set, not an error.
pub trait DetectionSource: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<DetectionSet>;

    /// Human-readable name (used in log output)
    fn name(&self) -> &str;
}

impl<T: DetectionSource + ?Sized> DetectionSource for Box<T> {
    fn detect(&self, image: &DynamicImage) -> anyhow::Result<DetectionSet> {
        (**self).detect(image)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Returns the same precomputed detections for every image.
#[derive(Debug, Clone, Default)]
pub struct FixedDetections {
    detections: DetectionSet,
}

impl FixedDetections {
    pub fn new(detections: DetectionSet) -> Self {
        Self { detections }
    }

    /// Load detections previously written by a detector as JSON
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self::new(DetectionSet::from_json_file(path)?))
    }
}

impl DetectionSource for FixedDetections {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<DetectionSet> {
        Ok(self.detections.clone())
    }

    fn name(&self) -> &str {
        "Fixed Detections"
    }
}

/// JSON file expected next to an image (`board.png` -> `board.json`)
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}
