#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, ImageBuffer, Rgb};
use pcbinspect::{Detection, DetectionSet, DetectionSource, Region};

/// Dark green board-colored image
pub fn board_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_fn(width, height, |_, _| Rgb([0u8, 80u8, 30u8])))
}

/// Detection with a 20x20 box at (x, y)
pub fn det(label: &str, x: i32, y: i32) -> Detection {
    Detection::new(label, Region::new(x, y, x + 20, y + 20))
}

pub fn detections(items: &[(&str, i32, i32)]) -> DetectionSet {
    items.iter().map(|(l, x, y)| det(l, *x, *y)).collect()
}

/// Writes a board image and its JSON sidecar into `dir`, returns the image path.
pub fn write_board(dir: &Path, name: &str, set: &DetectionSet) -> PathBuf {
    let image_path = dir.join(format!("{name}.png"));
    board_image(200, 150)
        .save(&image_path)
        .expect("Failed to save board image");
    set.to_json_file(dir.join(format!("{name}.json")))
        .expect("Failed to write detections");
    image_path
}

/// Detector that always fails, counting its calls
#[derive(Default)]
pub struct FailingDetector {
    pub calls: AtomicUsize,
}

impl DetectionSource for FailingDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<DetectionSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("model weights not found")
    }

    fn name(&self) -> &str {
        "Failing Detector"
    }
}

/// Detector returning a fixed set, counting its calls
pub struct CountingDetector {
    pub set: DetectionSet,
    pub calls: AtomicUsize,
}

impl CountingDetector {
    pub fn new(set: DetectionSet) -> Self {
        Self {
            set,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DetectionSource for CountingDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<DetectionSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.set.clone())
    }

    fn name(&self) -> &str {
        "Counting Detector"
    }
}
