use crate::models::error::CaptureError;
use crate::models::outcome::CaptureOutcome;
use crate::models::state::CoordinatorState;

/// UI-facing notifications from the coordinator.
///
/// Called on the thread that owns the coordinator, after its state has
/// been updated.
pub trait CoordinatorDelegate: Send + Sync {
    fn on_state_changed(&self, state: &CoordinatorState);

    /// Session progress as a fraction of the maximum duration, in `[0, 1]`.
    fn on_progress(&self, fraction: f64);

    /// Called exactly once per finalized session.
    fn on_outcome(&self, outcome: &CaptureOutcome);

    /// Non-terminal problems: refused starts, failed clips, interruptions.
    fn on_error(&self, error: &CaptureError);
}
