use std::path::PathBuf;

use crate::models::clip::Clip;
use crate::models::config::{CaptureSettings, ExportPreset};
use crate::models::error::CaptureError;
use crate::session::events::EventSender;

/// Platform capture backend that records clips and merges them.
///
/// Implemented by:
/// - `FsCaptureEngine` (filesystem simulation, `clip-capture-fs`)
/// - Future: an adapter over the platform AR/camera recorder
///
/// Requests return once the work is scheduled. Results arrive on `events`,
/// typically from a worker thread; an `Err` return means the request was
/// refused outright and no event will follow.
pub trait CaptureEngine: Send {
    /// Apply encoder settings and the session duration cap.
    fn configure(&mut self, settings: &CaptureSettings) -> Result<(), CaptureError>;

    /// Open a new clip and start appending frames.
    ///
    /// Reports `ClipStarted`, then `Progress` while recording. If the session
    /// cap is hit the engine closes the clip itself and reports
    /// `ClipCompleted` followed by `DurationLimitReached`.
    fn start_clip(&mut self, events: EventSender) -> Result<(), CaptureError>;

    /// Close the open clip. Reports `ClipCompleted` or `ClipFailed`.
    fn stop_clip(&mut self, events: EventSender) -> Result<(), CaptureError>;

    /// Merge `clips` in order into one file. Reports `MergeFinished`.
    ///
    /// The source clips are left untouched whether or not the merge succeeds.
    fn merge_clips(
        &mut self,
        clips: &[Clip],
        preset: ExportPreset,
        events: EventSender,
    ) -> Result<(), CaptureError>;

    /// Delete every clip and merged file the engine has produced.
    fn remove_all_clips(&mut self) -> Result<(), CaptureError>;

    fn clip_count(&self) -> usize;

    /// Duration of the engine's recorded clips in seconds.
    fn cumulative_duration(&self) -> f64;

    fn last_clip_path(&self) -> Option<PathBuf>;

    fn is_clip_open(&self) -> bool;
}
