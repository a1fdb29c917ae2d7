use std::path::Path;

use crate::models::error::CaptureError;
use crate::session::events::EventSender;

/// Destination for finished videos (the user's media library).
///
/// Saving is not idempotent: every call may create a new library entry.
pub trait MediaLibrarySink: Send {
    /// Persist the file at `file_path`. Reports `SaveFinished`.
    fn save(&mut self, file_path: &Path, events: EventSender) -> Result<(), CaptureError>;
}
