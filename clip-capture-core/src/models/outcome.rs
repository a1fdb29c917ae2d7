use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Why a session finished without a saved video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    NoFootage,
    MergeFailed(String),
    SaveFailed(String),
}

impl FailureReason {
    /// Whether the session's clips are still intact, so `finalize_session`
    /// may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::MergeFailed(_) | Self::SaveFailed(_))
    }
}

impl From<FailureReason> for CaptureError {
    fn from(reason: FailureReason) -> Self {
        match reason {
            FailureReason::NoFootage => CaptureError::NoFootage,
            FailureReason::MergeFailed(msg) => CaptureError::MergeFailed(msg),
            FailureReason::SaveFailed(msg) => CaptureError::SaveFailed(msg),
        }
    }
}

/// Where the library sink put a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAsset {
    pub asset_id: String,
    pub library_path: PathBuf,
    pub checksum: String,
}

/// A finished take that was handed to the library sink successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedVideo {
    /// File handed to the sink: the single clip, or the merged file.
    pub file_path: PathBuf,
    pub asset: SavedAsset,
    pub duration_secs: f64,
    pub clip_count: usize,
    pub merged: bool,
}

/// Terminal result of finalizing a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaptureOutcome {
    Saved(SavedVideo),
    Failed { reason: FailureReason },
}

impl CaptureOutcome {
    pub fn failed(reason: FailureReason) -> Self {
        Self::Failed { reason }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }

    pub fn saved(&self) -> Option<&SavedVideo> {
        match self {
            Self::Saved(video) => Some(video),
            Self::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Saved(_) => None,
            Self::Failed { reason } => Some(reason),
        }
    }

    /// Convert into a `Result` for callers that prefer `?`.
    pub fn into_result(self) -> Result<SavedVideo, CaptureError> {
        match self {
            Self::Saved(video) => Ok(video),
            Self::Failed { reason } => Err(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_serializes_with_reason_tag() {
        let outcome = CaptureOutcome::failed(FailureReason::MergeFailed("codec".into()));
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"]["reason"], "merge_failed");
        assert_eq!(json["reason"]["detail"], "codec");
    }

    #[test]
    fn only_merge_and_save_failures_are_retryable() {
        assert!(!FailureReason::NoFootage.is_retryable());
        assert!(FailureReason::MergeFailed(String::new()).is_retryable());
        assert!(FailureReason::SaveFailed(String::new()).is_retryable());
    }

    #[test]
    fn into_result_maps_reason_to_error() {
        let err = CaptureOutcome::failed(FailureReason::NoFootage)
            .into_result()
            .unwrap_err();
        assert_eq!(err, CaptureError::NoFootage);
    }
}
