use image::{DynamicImage, RgbImage};
use log::{debug, info};

use crate::detector::DetectionSource;
use crate::error::{InspectError, Result};
use crate::models::{ComparisonResult, DetectionSet, ReferenceSnapshot};
use crate::reconcile::{MatchPolicy, compare_with};
use crate::render::Annotator;

/// Output of inspecting one test image.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub detections: DetectionSet,
    pub result: ComparisonResult,
    pub annotated: RgbImage,
}

/// Holds the active reference board and the collaborators needed to check
/// test boards against it.
///
/// The reference snapshot is the only state; `set_reference`,
/// `load_reference` and `clear_reference` are the only calls that change it.
pub struct InspectionSession<D> {
    detector: D,
    reference: Option<ReferenceSnapshot>,
    policy: MatchPolicy,
    annotator: Annotator,
}

impl<D: DetectionSource> InspectionSession<D> {
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            reference: None,
            policy: MatchPolicy::default(),
            annotator: Annotator::default(),
        }
    }

    /// Matching policy used by every comparison
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    /// The active reference, if one is set
    pub fn reference(&self) -> Option<&ReferenceSnapshot> {
        self.reference.as_ref()
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Replace the active reference.
    pub fn set_reference(&mut self, detections: DetectionSet) {
        info!("reference set with {} detections", detections.len());
        self.reference = Some(ReferenceSnapshot::new(detections));
    }

    /// Drop the active reference; later comparisons fail until a new one is set.
    pub fn clear_reference(&mut self) {
        info!("reference cleared");
        self.reference = None;
    }

    /// Run the detector on a known-good board and make it the reference.
    pub fn load_reference(&mut self, image: &DynamicImage) -> Result<&ReferenceSnapshot> {
        let detections = self.detect(image)?;
        info!("reference loaded with {} detections", detections.len());
        Ok(&*self.reference.insert(ReferenceSnapshot::new(detections)))
    }

    /// Compare test detections against the active reference.
    pub fn compare_against_reference(&self, test: &DetectionSet) -> Result<ComparisonResult> {
        let reference = self.reference.as_ref().ok_or(InspectError::NoReference)?;
        compare_with(reference.detections(), test, self.policy)
    }

    /// Annotate `image` with `result` using the session's annotator
    pub fn render(&self, image: &DynamicImage, result: &ComparisonResult) -> Result<RgbImage> {
        self.annotator.render(image, result)
    }

    /// Detect, compare and annotate one test board.
    ///
    /// Fails with [`InspectError::NoReference`] before running the detector
    /// when no reference is set.
    pub fn inspect(&self, image: &DynamicImage) -> Result<Inspection> {
        if self.reference.is_none() {
            return Err(InspectError::NoReference);
        }
        let detections = self.detect(image)?;
        let result = self.compare_against_reference(&detections)?;
        let annotated = self.render(image, &result)?;
        Ok(Inspection {
            detections,
            result,
            annotated,
        })
    }

    /// Run the detector, rejecting empty images up front.
    pub fn detect(&self, image: &DynamicImage) -> Result<DetectionSet> {
        if image.width() == 0 || image.height() == 0 {
            return Err(InspectError::invalid_image(format!(
                "cannot detect on {}x{} image",
                image.width(),
                image.height()
            )));
        }
        let detections = self
            .detector
            .detect(image)
            .map_err(InspectError::DetectionSource)?;
        debug!("{}: {} detections", self.detector.name(), detections.len());
        Ok(detections)
    }
}
