/// Failures reported by the inspection core.
///
/// Each variant is a distinct condition so the host can react to it; nothing
/// here is retried or swallowed.
#[derive(thiserror::Error, Debug)]
pub enum InspectError {
    /// A comparison was requested before any reference board was set.
    #[error("no reference board loaded")]
    NoReference,

    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    /// Error returned by the detector, kept intact.
    #[error(transparent)]
    DetectionSource(anyhow::Error),

    #[error("invalid match policy: {reason}")]
    InvalidPolicy { reason: String },
}

impl InspectError {
    pub(crate) fn invalid_image(reason: impl Into<String>) -> Self {
        InspectError::InvalidImage {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = InspectError> = std::result::Result<T, E>;
