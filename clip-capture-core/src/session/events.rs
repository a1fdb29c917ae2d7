use std::path::PathBuf;
use std::sync::mpsc::Sender;

use crate::models::clip::Clip;
use crate::models::error::CaptureError;
use crate::models::outcome::SavedAsset;

/// Completion and progress reports from the capture engine and library sink.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// The engine began appending frames to a new clip.
    ClipStarted,
    /// Cumulative session duration in seconds, open clip included.
    Progress { cumulative_secs: f64 },
    /// The open clip was closed and written.
    ClipCompleted(Clip),
    /// The open clip could not be started or closed.
    ClipFailed(CaptureError),
    /// The session hit the configured maximum duration. Sent after the
    /// final `ClipCompleted`.
    DurationLimitReached,
    MergeFinished(Result<PathBuf, CaptureError>),
    SaveFinished(Result<SavedAsset, CaptureError>),
    Interrupted,
    InterruptionEnded,
}

/// A `CaptureEvent` tagged with the session generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub generation: u64,
    pub event: CaptureEvent,
}

/// Handle collaborators use to post events back to the coordinator.
///
/// Cheap to clone and `Send`, so it can be moved onto worker threads. Each
/// sender is bound to the session generation that was current when the
/// request was made; the coordinator drops envelopes from older sessions.
/// Posting after the coordinator is gone is a no-op.
#[derive(Debug, Clone)]
pub struct EventSender {
    generation: u64,
    tx: Sender<Envelope>,
}

impl EventSender {
    pub fn new(generation: u64, tx: Sender<Envelope>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn send(&self, event: CaptureEvent) {
        let envelope = Envelope {
            generation: self.generation,
            event,
        };
        if self.tx.send(envelope).is_err() {
            log::debug!("coordinator gone, dropping event for generation {}", self.generation);
        }
    }

    pub fn clip_started(&self) {
        self.send(CaptureEvent::ClipStarted);
    }

    pub fn progress(&self, cumulative_secs: f64) {
        self.send(CaptureEvent::Progress { cumulative_secs });
    }

    pub fn clip_completed(&self, clip: Clip) {
        self.send(CaptureEvent::ClipCompleted(clip));
    }

    pub fn clip_failed(&self, error: CaptureError) {
        self.send(CaptureEvent::ClipFailed(error));
    }

    pub fn duration_limit_reached(&self) {
        self.send(CaptureEvent::DurationLimitReached);
    }

    pub fn merge_finished(&self, result: Result<PathBuf, CaptureError>) {
        self.send(CaptureEvent::MergeFinished(result));
    }

    pub fn save_finished(&self, result: Result<SavedAsset, CaptureError>) {
        self.send(CaptureEvent::SaveFinished(result));
    }

    pub fn interrupted(&self) {
        self.send(CaptureEvent::Interrupted);
    }

    pub fn interruption_ended(&self) {
        self.send(CaptureEvent::InterruptionEnded);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn stamps_generation() {
        let (tx, rx) = mpsc::channel();
        let sender = EventSender::new(4, tx);
        sender.progress(1.5);

        let envelope = rx.recv().unwrap();
        assert_eq!(envelope.generation, 4);
        assert_eq!(envelope.event, CaptureEvent::Progress { cumulative_secs: 1.5 });
    }

    #[test]
    fn send_after_receiver_dropped_is_harmless() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        EventSender::new(0, tx).clip_started();
    }
}
