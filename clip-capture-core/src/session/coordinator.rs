use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::clip::Clip;
use crate::models::config::CoordinatorConfig;
use crate::models::error::CaptureError;
use crate::models::outcome::{CaptureOutcome, FailureReason, SavedAsset, SavedVideo};
use crate::models::session::Session;
use crate::models::state::{CoordinatorState, FinalizeStage};
use crate::session::events::{CaptureEvent, Envelope, EventSender};
use crate::traits::capture_engine::CaptureEngine;
use crate::traits::coordinator_delegate::CoordinatorDelegate;
use crate::traits::media_sink::MediaLibrarySink;

/// Slack when comparing the session duration against the cap.
const DURATION_EPSILON: f64 = 1e-6;

/// File handed to the sink, remembered until the sink reports back.
#[derive(Debug, Clone)]
struct PendingSave {
    file_path: PathBuf,
    duration_secs: f64,
    clip_count: usize,
    merged: bool,
}

/// Owns one recording session made of clips and drives it to an outcome.
///
/// The coordinator is mutated only through `&mut self`, on the thread that
/// owns it. Engines and sinks do their work elsewhere and report back by
/// posting `Envelope`s through an `EventSender`; the owner feeds them in with
/// `pump`, `process_next` or `wait_for_outcome`. Every envelope carries the
/// session generation it was issued for, and envelopes from a discarded or
/// reset session are dropped.
///
/// ```text
/// begin_recording ─→ engine.start_clip
/// end_recording   ─→ engine.stop_clip ─→ ClipCompleted
/// finalize_session ─→ (close open clip) ─→ merge if >1 clip ─→ sink.save ─→ outcome
/// ```
pub struct ClipCaptureCoordinator<E: CaptureEngine, S: MediaLibrarySink> {
    engine: E,
    sink: S,
    config: CoordinatorConfig,
    state: CoordinatorState,
    session: Session,
    pending_save: Option<PendingSave>,
    /// The engine closed the last clip before the user released.
    closed_by_engine: bool,
    /// Finalize was started by the duration cap; the user's own finalize
    /// for this session has not arrived yet.
    auto_finalized: bool,
    delegate: Option<Arc<dyn CoordinatorDelegate>>,
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
}

impl<E: CaptureEngine, S: MediaLibrarySink> ClipCaptureCoordinator<E, S> {
    /// Validate `config` and configure the engine with it.
    pub fn new(mut engine: E, sink: S, config: CoordinatorConfig) -> Result<Self, CaptureError> {
        config.validate()?;
        engine.configure(&config.capture_settings())?;

        let (tx, rx) = mpsc::channel();
        Ok(Self {
            engine,
            sink,
            config,
            state: CoordinatorState::Idle,
            session: Session::new(0),
            pending_save: None,
            closed_by_engine: false,
            auto_finalized: false,
            delegate: None,
            tx,
            rx,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CoordinatorDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Session progress as a fraction of the maximum duration.
    pub fn progress(&self) -> f64 {
        self.session.progress(self.config.max_duration_secs)
    }

    /// Outcome of the current session, once finalized.
    pub fn outcome(&self) -> Option<&CaptureOutcome> {
        self.state.outcome()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// A sender bound to the current session generation.
    ///
    /// Adapters that observe platform events outside of a request (for
    /// example interruptions) use this to feed them in.
    pub fn event_sender(&self) -> EventSender {
        EventSender::new(self.session.generation(), self.tx.clone())
    }

    // --- Operations ---

    /// Ask the engine to start the next clip. Transitions: idle → recording.
    ///
    /// If the engine refuses, the error goes to the delegate's `on_error`,
    /// the state stays idle, and nothing is retried.
    pub fn begin_recording(&mut self) -> Result<(), CaptureError> {
        if !self.state.is_idle() {
            return Err(self.usage(format!(
                "begin_recording while {}",
                self.state.name()
            )));
        }
        let cumulative = self.session.cumulative_duration();
        if cumulative + DURATION_EPSILON >= self.config.max_duration_secs {
            return Err(self.usage(format!(
                "begin_recording with {:.2}s recorded, maximum is {:.2}s",
                cumulative, self.config.max_duration_secs
            )));
        }

        let events = self.event_sender();
        if let Err(e) = self.engine.start_clip(events) {
            log::error!("Capture engine refused to start clip: {}", e);
            self.report_error(&e);
            return Ok(());
        }

        self.session.open_clip();
        self.closed_by_engine = false;
        log::info!(
            "Session {} recording clip {}",
            self.session.id(),
            self.session.clip_count() + 1
        );
        self.set_state(CoordinatorState::Recording);
        Ok(())
    }

    /// Ask the engine to close the open clip. Transitions: recording → stopping.
    ///
    /// The clip joins the session when the engine reports `ClipCompleted`.
    /// A release that arrives after the engine already closed the clip (at
    /// the duration cap or on interruption) is a no-op.
    pub fn end_recording(&mut self) -> Result<(), CaptureError> {
        if !self.state.is_recording() && self.closed_by_engine {
            log::info!(
                "Session {} end_recording after the engine closed the clip",
                self.session.id()
            );
            return Ok(());
        }
        if !self.state.is_recording() {
            return Err(self.usage(format!("end_recording while {}", self.state.name())));
        }

        let events = self.event_sender();
        if let Err(e) = self.engine.stop_clip(events) {
            log::error!("Capture engine refused to stop clip: {}", e);
            self.report_error(&e);
            return Ok(());
        }

        self.set_state(CoordinatorState::Stopping);
        Ok(())
    }

    /// Finish the take.
    ///
    /// Any open clip is closed first. Then more than one clip is merged,
    /// a single clip is used as is, and an empty session fails with
    /// `NoFootage`. The resulting file is saved to the library sink.
    ///
    /// Returns `Some(outcome)` when the outcome is known immediately, `None`
    /// while the engine or sink is still working. Either way the outcome is
    /// also delivered through the delegate's `on_outcome`.
    ///
    /// Calling this again after a merge or save failure retries with the
    /// clips that are still in the session.
    ///
    /// If the duration cap already started finalizing, the first call
    /// afterwards returns the current outcome (`None` while still working).
    pub fn finalize_session(&mut self) -> Result<Option<CaptureOutcome>, CaptureError> {
        if self.auto_finalized && (self.state.is_finalizing() || self.state.is_terminal()) {
            self.auto_finalized = false;
            log::info!(
                "Session {} already finalizing after reaching the limit",
                self.session.id()
            );
            return Ok(self.state.outcome().cloned());
        }

        match &self.state {
            CoordinatorState::Recording => {
                let events = self.event_sender();
                match self.engine.stop_clip(events) {
                    Ok(()) => self.set_state(CoordinatorState::Finalizing(FinalizeStage::ClosingClip)),
                    Err(e) => {
                        log::error!("Capture engine refused to close clip for finalize: {}", e);
                        self.report_error(&e);
                        self.session.abandon_open_clip();
                        self.resolve();
                    }
                }
            }
            CoordinatorState::Stopping => {
                // stop already requested; its ClipCompleted continues the finalize
                self.set_state(CoordinatorState::Finalizing(FinalizeStage::ClosingClip));
            }
            CoordinatorState::Idle => {
                if self.session.is_empty() && !self.session.recording_attempted() {
                    return Err(self.usage("finalize_session with nothing recorded".into()));
                }
                self.resolve();
            }
            CoordinatorState::Finalizing(_) => {
                return Err(self.usage("finalize_session while already finalizing".into()));
            }
            CoordinatorState::Finished(outcome) => {
                let retryable = outcome.failure().is_some_and(FailureReason::is_retryable);
                if !retryable || self.session.clip_count() == 0 {
                    return Err(self.usage(
                        "finalize_session after the outcome was delivered; call reset first".into(),
                    ));
                }
                log::info!("Session {} retrying finalize", self.session.id());
                self.resolve();
            }
        }

        Ok(self.state.outcome().cloned())
    }

    /// Drop the session's clips without producing an outcome.
    ///
    /// Allowed in any state. Completions still in flight for the discarded
    /// session are ignored when they arrive.
    pub fn discard_session(&mut self) -> Result<(), CaptureError> {
        log::info!("Session {} discarded", self.session.id());
        self.clear_session()
    }

    /// Return to idle with a fresh, empty session once the outcome has been
    /// consumed.
    pub fn reset(&mut self) -> Result<(), CaptureError> {
        if !self.state.is_terminal() {
            log::warn!(
                "Session {} reset while {}",
                self.session.id(),
                self.state.name()
            );
        }
        self.clear_session()
    }

    // --- Event processing ---

    /// Handle every event that is already queued. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            self.handle_event(envelope);
            handled += 1;
        }
        handled
    }

    /// Wait up to `timeout` for one event and handle it.
    pub fn process_next(&mut self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(envelope) => {
                self.handle_event(envelope);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Handle events until the session reaches an outcome or `timeout` passes.
    pub fn wait_for_outcome(&mut self, timeout: Duration) -> Option<CaptureOutcome> {
        let deadline = Instant::now() + timeout;
        while !self.state.is_terminal() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.process_next(remaining) {
                break;
            }
        }
        self.state.outcome().cloned()
    }

    /// Apply one event to the session.
    pub fn handle_event(&mut self, envelope: Envelope) {
        if envelope.generation != self.session.generation() {
            log::debug!(
                "Dropping stale {:?} for generation {} (current {})",
                envelope.event,
                envelope.generation,
                self.session.generation()
            );
            return;
        }

        match envelope.event {
            CaptureEvent::ClipStarted => {
                log::debug!("Session {} clip started", self.session.id());
            }
            CaptureEvent::Progress { cumulative_secs } => {
                if self.session.is_clip_open() {
                    self.session.update_progress(cumulative_secs);
                    self.notify_progress();
                }
            }
            CaptureEvent::ClipCompleted(clip) => self.on_clip_completed(clip),
            CaptureEvent::ClipFailed(error) => self.on_clip_failed(error),
            CaptureEvent::DurationLimitReached => self.on_duration_limit(),
            CaptureEvent::MergeFinished(result) => self.on_merge_finished(result),
            CaptureEvent::SaveFinished(result) => self.on_save_finished(result),
            CaptureEvent::Interrupted => {
                log::warn!("Session {} capture interrupted", self.session.id());
                self.report_error(&CaptureError::Interrupted);
            }
            CaptureEvent::InterruptionEnded => {
                log::info!("Session {} capture interruption ended", self.session.id());
            }
        }
    }

    fn on_clip_completed(&mut self, clip: Clip) {
        if !self.session.is_clip_open() {
            log::warn!("Ignoring clip {} completed with no clip open", clip.id);
            return;
        }

        log::info!(
            "Session {} clip {} closed ({:.2}s)",
            self.session.id(),
            clip.id,
            clip.duration_secs
        );
        self.session.append(clip);
        self.notify_progress();

        match self.state {
            CoordinatorState::Recording => {
                // engine closed the clip itself; DurationLimitReached follows
                self.closed_by_engine = true;
                self.set_state(CoordinatorState::Idle);
            }
            CoordinatorState::Stopping => {
                self.set_state(CoordinatorState::Idle);
                if self.limit_reached() && self.config.auto_finalize_on_limit {
                    self.auto_finalize();
                }
            }
            CoordinatorState::Finalizing(FinalizeStage::ClosingClip) => self.resolve(),
            _ => log::warn!("Clip completed while {}", self.state.name()),
        }
    }

    fn on_clip_failed(&mut self, error: CaptureError) {
        log::error!("Session {} clip failed: {}", self.session.id(), error);
        self.report_error(&error);
        if !self.session.is_clip_open() {
            return;
        }
        self.session.abandon_open_clip();
        self.notify_progress();

        match self.state {
            CoordinatorState::Recording => {
                self.closed_by_engine = true;
                self.set_state(CoordinatorState::Idle);
            }
            CoordinatorState::Stopping => self.set_state(CoordinatorState::Idle),
            CoordinatorState::Finalizing(FinalizeStage::ClosingClip) => self.resolve(),
            _ => {}
        }
    }

    fn on_duration_limit(&mut self) {
        log::info!(
            "Session {} reached the {:.2}s limit",
            self.session.id(),
            self.config.max_duration_secs
        );
        if self.state.is_idle() && self.config.auto_finalize_on_limit {
            self.auto_finalize();
        }
    }

    fn on_merge_finished(&mut self, result: Result<PathBuf, CaptureError>) {
        if self.state != CoordinatorState::Finalizing(FinalizeStage::Merging) {
            log::warn!("Ignoring merge result while {}", self.state.name());
            return;
        }
        match result {
            Ok(merged) => {
                log::info!("Session {} merged into {}", self.session.id(), merged.display());
                self.start_save(merged, true);
            }
            Err(e) => {
                log::error!("Session {} merge failed: {}", self.session.id(), e);
                self.finish(CaptureOutcome::failed(FailureReason::MergeFailed(e.to_string())));
            }
        }
    }

    fn on_save_finished(&mut self, result: Result<SavedAsset, CaptureError>) {
        if self.state != CoordinatorState::Finalizing(FinalizeStage::Saving) {
            log::warn!("Ignoring save result while {}", self.state.name());
            return;
        }
        let Some(pending) = self.pending_save.take() else {
            log::warn!("Ignoring save result with no save pending");
            return;
        };
        match result {
            Ok(asset) => {
                log::info!(
                    "Session {} saved to library as {}",
                    self.session.id(),
                    asset.asset_id
                );
                self.session.clear_clips();
                self.finish(CaptureOutcome::Saved(SavedVideo {
                    file_path: pending.file_path,
                    asset,
                    duration_secs: pending.duration_secs,
                    clip_count: pending.clip_count,
                    merged: pending.merged,
                }));
            }
            Err(e) => {
                log::error!("Session {} save failed: {}", self.session.id(), e);
                self.finish(CaptureOutcome::failed(FailureReason::SaveFailed(e.to_string())));
            }
        }
    }

    // --- Internal helpers ---

    /// Pick merge, single clip, or no footage for the closed clips.
    fn resolve(&mut self) {
        let engine_clips = self.engine.clip_count();
        if engine_clips != self.session.clip_count() {
            log::warn!(
                "Engine reports {} clips, session holds {}",
                engine_clips,
                self.session.clip_count()
            );
        }

        match self.session.clip_count() {
            0 => self.finish(CaptureOutcome::failed(FailureReason::NoFootage)),
            1 => {
                let path = self.session.clips()[0].file_path.clone();
                self.start_save(path, false);
            }
            n => {
                log::info!("Session {} merging {} clips", self.session.id(), n);
                let events = self.event_sender();
                let clips = self.session.clips().to_vec();
                match self.engine.merge_clips(&clips, self.config.merge_preset, events) {
                    Ok(()) => self.set_state(CoordinatorState::Finalizing(FinalizeStage::Merging)),
                    Err(e) => {
                        log::error!("Capture engine refused to merge: {}", e);
                        self.finish(CaptureOutcome::failed(FailureReason::MergeFailed(e.to_string())));
                    }
                }
            }
        }
    }

    fn start_save(&mut self, file_path: PathBuf, merged: bool) {
        let events = self.event_sender();
        if let Err(e) = self.sink.save(&file_path, events) {
            log::error!("Library sink refused to save {}: {}", file_path.display(), e);
            self.finish(CaptureOutcome::failed(FailureReason::SaveFailed(e.to_string())));
            return;
        }
        self.pending_save = Some(PendingSave {
            file_path,
            duration_secs: self.session.cumulative_duration(),
            clip_count: self.session.clip_count(),
            merged,
        });
        self.set_state(CoordinatorState::Finalizing(FinalizeStage::Saving));
    }

    fn finish(&mut self, outcome: CaptureOutcome) {
        self.pending_save = None;
        self.set_state(CoordinatorState::Finished(outcome.clone()));
        if let Some(ref delegate) = self.delegate {
            delegate.on_outcome(&outcome);
        }
    }

    fn auto_finalize(&mut self) {
        match self.finalize_session() {
            Ok(_) => self.auto_finalized = true,
            Err(e) => log::error!("Automatic finalize at duration limit failed: {}", e),
        }
    }

    fn clear_session(&mut self) -> Result<(), CaptureError> {
        if self.session.is_clip_open() {
            // the completion lands on the old generation and is dropped
            let events = self.event_sender();
            if let Err(e) = self.engine.stop_clip(events) {
                log::warn!("Failed to stop open clip while clearing session: {}", e);
            }
        }
        let removed = self.engine.remove_all_clips();
        if let Err(ref e) = removed {
            log::error!("Failed to remove clips: {}", e);
            self.report_error(e);
        }

        self.session = self.session.next();
        self.pending_save = None;
        self.closed_by_engine = false;
        self.auto_finalized = false;
        self.set_state(CoordinatorState::Idle);
        self.notify_progress();
        removed
    }

    fn limit_reached(&self) -> bool {
        self.session.cumulative_duration() + DURATION_EPSILON >= self.config.max_duration_secs
    }

    fn set_state(&mut self, new_state: CoordinatorState) {
        log::debug!("Coordinator {} → {}", self.state.name(), new_state.name());
        self.state = new_state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&self.state);
        }
    }

    fn notify_progress(&self) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_progress(self.progress());
        }
    }

    fn report_error(&self, error: &CaptureError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }

    fn usage(&self, message: String) -> CaptureError {
        log::error!("Coordinator usage error: {}", message);
        CaptureError::UsageError(message)
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
