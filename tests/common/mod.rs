mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from pcbinspect for tests
#[allow(unused_imports)]
pub use pcbinspect::{
    ComparisonResult, Detection, DetectionSet, DetectionSource, FixedDetections, InspectError,
    InspectionSession, MatchPolicy, Region, Status,
};
