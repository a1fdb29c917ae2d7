use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::config::VideoCodec;
use crate::models::error::CaptureError;

/// Description of a video saved to the library, stored as a JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub source_file: String,
    pub album: String,
    pub checksum: String,
    pub size_bytes: u64,
    pub created_at: String,
    pub codec: Option<VideoCodec>,
}

/// Path of the sidecar for `video_path`: `{video}.metadata.json`.
pub fn metadata_path(video_path: &Path) -> PathBuf {
    let mut name = video_path.as_os_str().to_owned();
    name.push(".metadata.json");
    PathBuf::from(name)
}

/// Write `metadata` as a JSON sidecar next to `video_path`.
pub fn write_metadata(metadata: &VideoMetadata, video_path: &Path) -> Result<(), CaptureError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(metadata_path(video_path), json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read the JSON sidecar written by `write_metadata`.
pub fn read_metadata(video_path: &Path) -> Result<VideoMetadata, CaptureError> {
    let json = fs::read_to_string(metadata_path(video_path))
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))
}
