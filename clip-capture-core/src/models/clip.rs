use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One continuous recorded video segment.
///
/// Created by the capture engine when a clip is closed and never mutated
/// afterwards. The file on disk belongs to the engine until the session is
/// discarded or reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: Uuid,
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub created_at: DateTime<Utc>,
}

impl Clip {
    pub fn new(file_path: PathBuf, duration_secs: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_path,
            duration_secs,
            created_at: Utc::now(),
        }
    }
}
