use thiserror::Error;

/// Errors produced by the clip capture coordinator and its collaborators.
///
/// `NoFootage`, `MergeFailed` and `SaveFailed` are recoverable and reach the
/// UI as a failed `CaptureOutcome`. `UsageError` means the caller drove the
/// state machine out of order and is a defect in the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no footage recorded")]
    NoFootage,

    #[error("merge failed: {0}")]
    MergeFailed(String),

    #[error("save failed: {0}")]
    SaveFailed(String),

    #[error("usage error: {0}")]
    UsageError(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("capture device busy")]
    DeviceBusy,

    #[error("clip failed: {0}")]
    ClipFailed(String),

    #[error("capture interrupted")]
    Interrupted,

    #[error("storage error: {0}")]
    StorageError(String),
}

impl CaptureError {
    /// Whether the error describes a caller defect rather than a runtime condition.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::UsageError(_))
    }
}
