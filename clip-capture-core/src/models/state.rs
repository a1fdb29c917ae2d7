use super::outcome::CaptureOutcome;

/// What the coordinator is waiting on while finalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeStage {
    /// Waiting for the engine to close the clip that was still recording.
    ClosingClip,
    /// Waiting for the engine to merge the session's clips.
    Merging,
    /// Waiting for the library sink to persist the finished file.
    Saving,
}

/// Coordinator state machine.
///
/// State transitions:
/// ```text
/// idle → recording → stopping → idle   (once per clip)
///   ↓        ↓          ↓
///   └────────┴──────────┴→ finalizing (closing clip → merging → saving)
///                                  ↓
///                               finished ──reset()──→ idle
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorState {
    Idle,
    Recording,
    Stopping,
    Finalizing(FinalizeStage),
    Finished(CaptureOutcome),
}

impl CoordinatorState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_finalizing(&self) -> bool {
        matches!(self, Self::Finalizing(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    pub fn outcome(&self) -> Option<&CaptureOutcome> {
        match self {
            Self::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Short lowercase name, used in logs and UI event payloads.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
            Self::Finalizing(FinalizeStage::ClosingClip) => "closing-clip",
            Self::Finalizing(FinalizeStage::Merging) => "merging",
            Self::Finalizing(FinalizeStage::Saving) => "saving",
            Self::Finished(_) => "finished",
        }
    }
}
