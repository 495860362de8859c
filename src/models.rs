use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel coordinates of the source image.
///
/// Serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Region {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Region {
    /// Build a region from two corners, swapping them if given out of order.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Horizontal extent in pixels
    pub fn width(&self) -> u32 {
        self.x2.abs_diff(self.x1)
    }

    /// Vertical extent in pixels
    pub fn height(&self) -> u32 {
        self.y2.abs_diff(self.y1)
    }

    /// Box area, widened so full-range coordinates cannot overflow
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Overlapping part of two regions, if they overlap with non-zero area.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);
        if x1 >= x2 || y1 >= y2 {
            return None;
        }
        Some(Region { x1, y1, x2, y2 })
    }

    /// Intersection over union, `0.0` when either region is degenerate.
    pub fn iou(&self, other: &Region) -> f32 {
        let inter = self.intersection(other).map(|r| r.area()).unwrap_or(0) as u128;
        // Two full-range areas do not fit in u64 when summed
        let union = self.area() as u128 + other.area() as u128 - inter;
        if union == 0 {
            return 0.0;
        }
        (inter as f64 / union as f64) as f32
    }
}

impl From<[i32; 4]> for Region {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Region::new(x1, y1, x2, y2)
    }
}

impl From<Region> for [i32; 4] {
    fn from(r: Region) -> Self {
        [r.x1, r.y1, r.x2, r.y2]
    }
}

/// One labeled component found by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Component class reported by the detector (e.g. "R1", "C3")
    pub label: String,
    pub region: Region,
    /// Detector score, carried for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Detection {
    pub fn new(label: impl Into<String>, region: Region) -> Self {
        Self {
            label: label.into(),
            region,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// All detections for one image, in detector order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionSet(Vec<Detection>);

impl DetectionSet {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self(detections)
    }

    /// Number of detections, duplicates included
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Detections in detector order
    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Detection] {
        &self.0
    }

    /// Labels in detector order, duplicates kept
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|d| d.label.as_str())
    }

    /// Load a JSON array of detections
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detections from {}", path.display()))?;
        let set = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse detections in {}", path.display()))?;
        Ok(set)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write detections to {}", path.display()))?;
        Ok(())
    }
}

impl From<Vec<Detection>> for DetectionSet {
    fn from(detections: Vec<Detection>) -> Self {
        Self(detections)
    }
}

impl FromIterator<Detection> for DetectionSet {
    fn from_iter<I: IntoIterator<Item = Detection>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The known-good board's detections, held by a session until replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSnapshot {
    detections: DetectionSet,
}

impl ReferenceSnapshot {
    pub fn new(detections: DetectionSet) -> Self {
        Self { detections }
    }

    /// Detections captured from the reference board
    pub fn detections(&self) -> &DetectionSet {
        &self.detections
    }
}

/// Classification of one test detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The component is expected on the reference board
    Correct,
    /// The component does not belong on the board
    Extra,
}

/// A test detection together with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEntry {
    pub label: String,
    /// Box in the test image, kept for drawing
    pub region: Region,
    pub status: Status,
}

/// A reference label with no counterpart on the test board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingEntry {
    pub label: String,
}

/// Outcome of comparing a test board against the reference.
///
/// `entries` has one item per test detection, in test order. `missing` has one
/// item per reference label with no counterpart, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub entries: Vec<ClassifiedEntry>,
    pub missing: Vec<MissingEntry>,
}

impl ComparisonResult {
    pub fn correct_count(&self) -> usize {
        self.count_status(Status::Correct)
    }

    pub fn extra_count(&self) -> usize {
        self.count_status(Status::Extra)
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    /// True when nothing is extra and nothing is missing
    pub fn is_pass(&self) -> bool {
        self.extra_count() == 0 && self.missing.is_empty()
    }

    fn count_status(&self, status: Status) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}
