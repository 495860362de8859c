use std::collections::HashSet;

use log::debug;

use crate::error::{InspectError, Result};
use crate::models::{ClassifiedEntry, ComparisonResult, Detection, DetectionSet, MissingEntry, Status};

/// How a test detection is matched against the reference.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MatchPolicy {
    /// Correct when the label occurs anywhere in the reference. Position is ignored.
    #[default]
    Label,
    /// Correct when a reference detection with the same label overlaps it
    /// with at least `min_iou`.
    LabelAndOverlap { min_iou: f32 },
}

impl MatchPolicy {
    pub fn validate(&self) -> Result<()> {
        match *self {
            MatchPolicy::Label => Ok(()),
            MatchPolicy::LabelAndOverlap { min_iou } => {
                if (0.0..=1.0).contains(&min_iou) {
                    Ok(())
                } else {
                    Err(InspectError::InvalidPolicy {
                        reason: format!("min_iou must be within [0, 1], got {min_iou}"),
                    })
                }
            }
        }
    }
}

/// Classify every test detection against the reference by label membership.
///
/// Several test detections sharing a reference label are all correct; a
/// reference label absent from the test set is reported missing once, no
/// matter how often it occurs in the reference.
pub fn compare(reference: &DetectionSet, test: &DetectionSet) -> ComparisonResult {
    let reference_labels: HashSet<&str> = reference.labels().collect();

    let entries = test
        .iter()
        .map(|d| {
            let status = if reference_labels.contains(d.label.as_str()) {
                Status::Correct
            } else {
                Status::Extra
            };
            classify(d, status)
        })
        .collect();

    let test_labels: HashSet<&str> = test.labels().collect();
    let missing = missing_labels(reference, |label| test_labels.contains(label));

    let result = ComparisonResult { entries, missing };
    log_summary(&result);
    result
}

/// Like [`compare`], with a selectable matching policy.
pub fn compare_with(
    reference: &DetectionSet,
    test: &DetectionSet,
    policy: MatchPolicy,
) -> Result<ComparisonResult> {
    policy.validate()?;
    match policy {
        MatchPolicy::Label => Ok(compare(reference, test)),
        MatchPolicy::LabelAndOverlap { min_iou } => Ok(compare_overlap(reference, test, min_iou)),
    }
}

fn compare_overlap(reference: &DetectionSet, test: &DetectionSet, min_iou: f32) -> ComparisonResult {
    let mut matched_labels: HashSet<&str> = HashSet::new();

    let entries = test
        .iter()
        .map(|d| {
            let hit = reference
                .iter()
                .any(|r| r.label == d.label && r.region.iou(&d.region) >= min_iou);
            if hit {
                matched_labels.insert(d.label.as_str());
                classify(d, Status::Correct)
            } else {
                classify(d, Status::Extra)
            }
        })
        .collect();

    let missing = missing_labels(reference, |label| matched_labels.contains(label));

    let result = ComparisonResult { entries, missing };
    log_summary(&result);
    result
}

fn classify(d: &Detection, status: Status) -> ClassifiedEntry {
    ClassifiedEntry {
        label: d.label.clone(),
        region: d.region,
        status,
    }
}

/// Distinct reference labels not accepted by `present`, in first-occurrence order.
fn missing_labels<'a>(reference: &'a DetectionSet, present: impl Fn(&str) -> bool) -> Vec<MissingEntry> {
    let mut seen: HashSet<&'a str> = HashSet::new();
    reference
        .labels()
        .filter(|label| seen.insert(*label) && !present(*label))
        .map(|label| MissingEntry {
            label: label.to_string(),
        })
        .collect()
}

fn log_summary(result: &ComparisonResult) {
    debug!(
        "compared: {} correct, {} extra, {} missing",
        result.correct_count(),
        result.extra_count(),
        result.missing_count()
    );
}
