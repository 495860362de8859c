pub mod capture;
pub mod detector;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod render;
pub mod session;

pub use detector::{DetectionSource, FixedDetections};
pub use error::InspectError;
pub use models::{
    ClassifiedEntry, ComparisonResult, Detection, DetectionSet, MissingEntry, ReferenceSnapshot,
    Region, Status,
};
pub use reconcile::{MatchPolicy, compare, compare_with};
pub use render::{Annotator, Palette, RenderConfig, render};
pub use session::{Inspection, InspectionSession};
