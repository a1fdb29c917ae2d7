//! Filesystem-backed capture engine.
//!
//! Records clips into a working directory on a dedicated writer thread,
//! pulling one frame per tick from a `FrameSource`. Stands in for a camera
//! recorder wherever the coordinator needs a real engine: demos, integration
//! tests, headless hosts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use clip_capture_core::models::clip::Clip;
use clip_capture_core::models::config::{CaptureSettings, ExportPreset, VideoSettings};
use clip_capture_core::models::error::CaptureError;
use clip_capture_core::session::events::EventSender;
use clip_capture_core::traits::capture_engine::CaptureEngine;

use crate::clip_format::{self, ClipFormatError, ClipWriter};

/// Produces the payload for frame `index` of the current clip.
pub type FrameSource = Arc<dyn Fn(u64) -> Vec<u8> + Send + Sync + 'static>;

const CLIP_EXTENSION: &str = "nlclip";

/// Frame source that writes the frame index, padded to a fixed size.
pub fn counting_frames(frame_size: usize) -> FrameSource {
    Arc::new(move |index: u64| {
        let mut frame = vec![0u8; frame_size.max(8)];
        frame[..8].copy_from_slice(&index.to_le_bytes());
        frame
    })
}

/// Frame source shaped by the encoder settings: each frame carries
/// `bit_rate / frame_rate` bits, starts with its index, and byte 8 marks a
/// key frame every `max_key_frame_interval` frames.
pub fn encoded_frames(video: &VideoSettings) -> FrameSource {
    let frame_rate = u64::from(video.frame_rate.max(1));
    let frame_size = ((u64::from(video.bit_rate) / 8 / frame_rate) as usize).max(9);
    let key_frame_interval = u64::from(video.max_key_frame_interval.max(1));
    Arc::new(move |index: u64| {
        let mut frame = vec![0u8; frame_size];
        frame[..8].copy_from_slice(&index.to_le_bytes());
        frame[8] = u8::from(index % key_frame_interval == 0);
        frame
    })
}

/// A merge running on its own thread.
struct MergeJob {
    cancel: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

/// Clips and merged files produced so far. Shared with worker threads.
#[derive(Default)]
struct EngineShared {
    clips: Vec<Clip>,
    merged_files: Vec<PathBuf>,
    clip_open: bool,
}

impl EngineShared {
    fn recorded_secs(&self) -> f64 {
        self.clips.iter().map(|c| c.duration_secs).sum()
    }
}

/// Simulated capture engine writing `clip_format` files.
pub struct FsCaptureEngine {
    working_dir: PathBuf,
    frame_source: Option<FrameSource>,
    tick: Option<Duration>,
    settings: Option<CaptureSettings>,
    shared: Arc<Mutex<EngineShared>>,
    running: Arc<AtomicBool>,
    writer_handle: Option<thread::JoinHandle<()>>,
    merge_jobs: Vec<MergeJob>,
}

impl FsCaptureEngine {
    /// Engine writing into `working_dir`, one frame per frame interval.
    /// Frames come from `encoded_frames` unless a source is set.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            frame_source: None,
            tick: None,
            settings: None,
            shared: Arc::new(Mutex::new(EngineShared::default())),
            running: Arc::new(AtomicBool::new(false)),
            writer_handle: None,
            merge_jobs: Vec::new(),
        }
    }

    pub fn with_frame_source(mut self, frame_source: FrameSource) -> Self {
        self.frame_source = Some(frame_source);
        self
    }

    /// Wall-clock time between frames. Defaults to the real frame interval;
    /// a shorter tick records faster than real time.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = Some(tick);
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn clips(&self) -> Vec<Clip> {
        self.shared.lock().clips.clone()
    }

    /// Simulate the platform interrupting capture (phone call, backgrounding).
    ///
    /// Reports `Interrupted` and closes the open clip, whose completion is
    /// reported as usual.
    pub fn interrupt(&mut self, events: &EventSender) -> Result<(), CaptureError> {
        events.interrupted();
        self.halt_writer()
    }

    pub fn end_interruption(&mut self, events: &EventSender) {
        events.interruption_ended();
    }

    fn settings(&self) -> Result<&CaptureSettings, CaptureError> {
        self.settings
            .as_ref()
            .ok_or_else(|| CaptureError::ConfigurationFailed("engine not configured".into()))
    }

    /// Stop the writer thread and wait for it to close its clip.
    fn halt_writer(&mut self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.writer_handle.take() {
            handle
                .join()
                .map_err(|_| CaptureError::ClipFailed("clip writer thread panicked".into()))?;
        }
        Ok(())
    }

    /// Tell every running merge to stop and forget it. A cancelled merge
    /// removes its own output.
    fn cancel_merges(&mut self) -> Vec<thread::JoinHandle<()>> {
        self.merge_jobs
            .drain(..)
            .map(|job| {
                job.cancel.store(true, Ordering::SeqCst);
                job.handle
            })
            .collect()
    }
}

impl CaptureEngine for FsCaptureEngine {
    fn configure(&mut self, settings: &CaptureSettings) -> Result<(), CaptureError> {
        if settings.video.frame_rate == 0 || settings.video.frame_rate > u32::from(u16::MAX) {
            return Err(CaptureError::ConfigurationFailed(format!(
                "unsupported frame rate: {}",
                settings.video.frame_rate
            )));
        }
        fs::create_dir_all(&self.working_dir).map_err(|e| {
            CaptureError::StorageError(format!("failed to create working directory: {}", e))
        })?;
        log::info!(
            "Capture engine configured: {} fps, {:.1}s max, {:?}",
            settings.video.frame_rate,
            settings.max_duration_secs,
            settings.video.codec
        );
        self.settings = Some(settings.clone());
        Ok(())
    }

    fn start_clip(&mut self, events: EventSender) -> Result<(), CaptureError> {
        let settings = self.settings()?.clone();
        let (recorded_secs, clip_open) = {
            let shared = self.shared.lock();
            (shared.recorded_secs(), shared.clip_open)
        };
        if clip_open {
            return Err(CaptureError::DeviceBusy);
        }
        // reap a writer that closed its clip on its own at the limit
        self.halt_writer()?;

        let frame_rate = settings.video.frame_rate as u16;
        let remaining_secs = (settings.max_duration_secs - recorded_secs).max(0.0);
        let frame_budget = (remaining_secs * f64::from(frame_rate)).floor() as u64;
        if frame_budget == 0 {
            return Err(CaptureError::ClipFailed("maximum duration reached".into()));
        }

        let path = self
            .working_dir
            .join(format!("clip_{}.{}", uuid::Uuid::new_v4(), CLIP_EXTENSION));
        let writer = ClipWriter::create(path, frame_rate)
            .map_err(|e| CaptureError::StorageError(format!("failed to create clip: {}", e)))?;

        let tick = self
            .tick
            .unwrap_or_else(|| Duration::from_secs_f64(1.0 / f64::from(frame_rate)));

        self.shared.lock().clip_open = true;
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let shared = Arc::clone(&self.shared);
        let source = match &self.frame_source {
            Some(source) => Arc::clone(source),
            None => encoded_frames(&settings.video),
        };

        let handle = thread::Builder::new()
            .name("clip-writer".into())
            .spawn(move || {
                events.clip_started();
                let job = ClipJob {
                    writer,
                    frame_budget,
                    recorded_secs,
                    tick,
                };
                job.run(&running, &shared, &source, &events);
                running.store(false, Ordering::SeqCst);
            })
            .map_err(|e| {
                self.shared.lock().clip_open = false;
                self.running.store(false, Ordering::SeqCst);
                CaptureError::ClipFailed(format!("failed to spawn clip writer: {}", e))
            })?;

        self.writer_handle = Some(handle);
        Ok(())
    }

    /// Completion is reported on the sender the clip was started with.
    fn stop_clip(&mut self, _events: EventSender) -> Result<(), CaptureError> {
        if !self.shared.lock().clip_open {
            log::debug!("stop_clip with no clip open");
            return Ok(());
        }
        self.halt_writer()
    }

    fn merge_clips(
        &mut self,
        clips: &[Clip],
        preset: ExportPreset,
        events: EventSender,
    ) -> Result<(), CaptureError> {
        if clips.is_empty() {
            return Err(CaptureError::MergeFailed("no clips to merge".into()));
        }
        let inputs: Vec<PathBuf> = clips.iter().map(|c| c.file_path.clone()).collect();
        let output = self
            .working_dir
            .join(format!("merged_{}.{}", uuid::Uuid::new_v4(), CLIP_EXTENSION));
        let shared = Arc::clone(&self.shared);
        let cancel = Arc::new(AtomicBool::new(false));
        let job_cancel = Arc::clone(&cancel);

        log::info!("Merging {} clips with {:?}", inputs.len(), preset);

        let handle = thread::Builder::new()
            .name("clip-merge".into())
            .spawn(move || {
                let result = run_merge(&inputs, output, &job_cancel, &shared);
                events.merge_finished(result);
            })
            .map_err(|e| CaptureError::MergeFailed(format!("failed to spawn merge: {}", e)))?;

        self.merge_jobs.retain(|job| !job.handle.is_finished());
        self.merge_jobs.push(MergeJob { cancel, handle });
        Ok(())
    }

    /// Running merges are cancelled, not waited for.
    fn remove_all_clips(&mut self) -> Result<(), CaptureError> {
        self.halt_writer()?;
        let cancelled = self.cancel_merges();
        if !cancelled.is_empty() {
            log::debug!("Cancelled {} running merges", cancelled.len());
        }

        let files: Vec<PathBuf> = {
            let mut shared = self.shared.lock();
            let mut files: Vec<PathBuf> = shared.clips.drain(..).map(|c| c.file_path).collect();
            files.append(&mut shared.merged_files);
            files
        };

        let mut first_error = None;
        for file in &files {
            match fs::remove_file(file) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    log::error!("Failed to remove {}: {}", file.display(), e);
                    first_error.get_or_insert_with(|| {
                        CaptureError::StorageError(format!("failed to remove {}: {}", file.display(), e))
                    });
                }
            }
        }
        log::info!("Removed {} capture files", files.len());

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn clip_count(&self) -> usize {
        self.shared.lock().clips.len()
    }

    fn cumulative_duration(&self) -> f64 {
        self.shared.lock().recorded_secs()
    }

    fn last_clip_path(&self) -> Option<PathBuf> {
        self.shared.lock().clips.last().map(|c| c.file_path.clone())
    }

    fn is_clip_open(&self) -> bool {
        self.shared.lock().clip_open
    }
}

impl Drop for FsCaptureEngine {
    fn drop(&mut self) {
        let _ = self.halt_writer();
        for handle in self.cancel_merges() {
            let _ = handle.join();
        }
    }
}

/// Body of a merge thread. A merge cancelled after `concat` finished
/// deletes the file it just wrote.
fn run_merge(
    inputs: &[PathBuf],
    output: PathBuf,
    cancel: &AtomicBool,
    shared: &Mutex<EngineShared>,
) -> Result<PathBuf, CaptureError> {
    match clip_format::concat_cancellable(inputs, &output, cancel) {
        Ok(header) => {
            // remove_all_clips sets the flag before taking the lock
            let mut state = shared.lock();
            if cancel.load(Ordering::SeqCst) {
                drop(state);
                let _ = fs::remove_file(&output);
                log::debug!("Merge into {} cancelled after completion", output.display());
                return Err(CaptureError::MergeFailed(ClipFormatError::Cancelled.to_string()));
            }
            state.merged_files.push(output.clone());
            drop(state);
            log::debug!(
                "Merged {} frames into {}",
                header.frame_count,
                output.display()
            );
            Ok(output)
        }
        Err(ClipFormatError::Cancelled) => {
            log::debug!("Merge into {} cancelled", output.display());
            Err(CaptureError::MergeFailed(ClipFormatError::Cancelled.to_string()))
        }
        Err(e) => {
            log::error!("Merge failed: {}", e);
            Err(CaptureError::MergeFailed(e.to_string()))
        }
    }
}

/// One clip being recorded on the writer thread.
struct ClipJob {
    writer: ClipWriter,
    frame_budget: u64,
    recorded_secs: f64,
    tick: Duration,
}

impl ClipJob {
    fn run(
        mut self,
        running: &AtomicBool,
        shared: &Mutex<EngineShared>,
        source: &FrameSource,
        events: &EventSender,
    ) {
        let frame_rate = f64::from(self.writer.frame_rate());
        let mut frames: u64 = 0;
        let mut hit_limit = false;
        let mut write_error = None;

        while running.load(Ordering::SeqCst) {
            if frames >= self.frame_budget {
                hit_limit = true;
                break;
            }
            thread::sleep(self.tick);
            if !running.load(Ordering::SeqCst) {
                break;
            }

            if let Err(e) = self.writer.write_frame(&source(frames)) {
                write_error = Some(e);
                break;
            }
            frames += 1;
            events.progress(self.recorded_secs + frames as f64 / frame_rate);
        }

        let path = self.writer.path().to_path_buf();
        let closed = match write_error {
            Some(e) => Err(CaptureError::ClipFailed(format!("frame write failed: {}", e))),
            None => self
                .writer
                .finish()
                .map_err(|e| CaptureError::ClipFailed(format!("failed to close clip: {}", e))),
        };

        let mut state = shared.lock();
        state.clip_open = false;
        match closed {
            Ok(header) if header.frame_count > 0 => {
                let clip = Clip::new(path, header.duration_secs());
                log::debug!("Clip closed: {} frames, {:.2}s", header.frame_count, clip.duration_secs);
                state.clips.push(clip.clone());
                drop(state);
                events.clip_completed(clip);
                if hit_limit {
                    events.duration_limit_reached();
                }
            }
            Ok(_) => {
                drop(state);
                let _ = fs::remove_file(&path);
                events.clip_failed(CaptureError::ClipFailed("no frames captured".into()));
            }
            Err(e) => {
                drop(state);
                let _ = fs::remove_file(&path);
                events.clip_failed(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use clip_capture_core::models::config::{AudioSettings, VideoSettings};
    use clip_capture_core::session::events::{CaptureEvent, Envelope};

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fs_engine_test_{}_{}", name, uuid::Uuid::new_v4()))
    }

    fn settings(max_duration_secs: f64) -> CaptureSettings {
        CaptureSettings {
            max_duration_secs,
            video: VideoSettings {
                frame_rate: 20,
                ..VideoSettings::default()
            },
            audio: AudioSettings::default(),
        }
    }

    fn engine(name: &str, max_duration_secs: f64) -> FsCaptureEngine {
        let mut engine = FsCaptureEngine::new(temp_dir(name)).with_tick(Duration::from_millis(1));
        engine.configure(&settings(max_duration_secs)).unwrap();
        engine
    }

    /// Skip progress noise and return the next interesting event.
    fn next_event(rx: &mpsc::Receiver<Envelope>) -> CaptureEvent {
        loop {
            let envelope = rx.recv_timeout(WAIT).unwrap();
            match envelope.event {
                CaptureEvent::Progress { .. } | CaptureEvent::ClipStarted => continue,
                event => return event,
            }
        }
    }

    fn record(engine: &mut FsCaptureEngine, sender: &EventSender) -> Clip {
        engine.start_clip(sender.clone()).unwrap();
        thread::sleep(Duration::from_millis(20));
        engine.stop_clip(sender.clone()).unwrap();
        engine.clips().last().cloned().unwrap()
    }

    #[test]
    fn start_and_stop_produce_a_clip_file() {
        let mut engine = engine("clip", 30.0);
        let (tx, rx) = mpsc::channel();
        let sender = EventSender::new(1, tx);

        engine.start_clip(sender.clone()).unwrap();
        assert!(engine.is_clip_open());
        thread::sleep(Duration::from_millis(20));
        engine.stop_clip(sender).unwrap();
        assert!(!engine.is_clip_open());

        let clip = match next_event(&rx) {
            CaptureEvent::ClipCompleted(clip) => clip,
            other => panic!("unexpected event: {:?}", other),
        };
        assert!(clip.file_path.starts_with(engine.working_dir()));
        assert!(clip.duration_secs > 0.0);
        let header = clip_format::probe(&clip.file_path).unwrap();
        approx::assert_relative_eq!(header.duration_secs(), clip.duration_secs);

        assert_eq!(engine.clip_count(), 1);
        assert_eq!(engine.last_clip_path(), Some(clip.file_path));
        approx::assert_relative_eq!(engine.cumulative_duration(), clip.duration_secs);

        engine.remove_all_clips().unwrap();
        fs::remove_dir_all(engine.working_dir()).ok();
    }

    #[test]
    fn stop_without_open_clip_is_a_no_op() {
        let mut engine = engine("noop", 30.0);
        let (tx, rx) = mpsc::channel();
        engine.stop_clip(EventSender::new(0, tx)).unwrap();
        assert!(rx.try_recv().is_err());
        fs::remove_dir_all(engine.working_dir()).ok();
    }

    #[test]
    fn second_start_while_open_is_busy() {
        let mut engine = engine("busy", 30.0);
        let (tx, _rx) = mpsc::channel();
        let sender = EventSender::new(0, tx);

        engine.start_clip(sender.clone()).unwrap();
        assert_eq!(engine.start_clip(sender.clone()), Err(CaptureError::DeviceBusy));

        engine.stop_clip(sender).unwrap();
        engine.remove_all_clips().unwrap();
        fs::remove_dir_all(engine.working_dir()).ok();
    }

    #[test]
    fn start_before_configure_fails() {
        let mut engine = FsCaptureEngine::new(temp_dir("unconfigured"));
        let (tx, _rx) = mpsc::channel();
        let err = engine.start_clip(EventSender::new(0, tx)).unwrap_err();
        assert!(matches!(err, CaptureError::ConfigurationFailed(_)));
    }

    #[test]
    fn configure_rejects_zero_frame_rate() {
        let mut engine = FsCaptureEngine::new(temp_dir("zero-fps"));
        let mut bad = settings(10.0);
        bad.video.frame_rate = 0;
        assert!(matches!(
            engine.configure(&bad),
            Err(CaptureError::ConfigurationFailed(_))
        ));
    }

    #[test]
    fn clip_closes_itself_at_the_limit() {
        // 0.25s at 20 fps is five frames
        let mut engine = engine("limit", 0.25);
        let (tx, rx) = mpsc::channel();
        engine.start_clip(EventSender::new(0, tx)).unwrap();

        let clip = match next_event(&rx) {
            CaptureEvent::ClipCompleted(clip) => clip,
            other => panic!("unexpected event: {:?}", other),
        };
        approx::assert_relative_eq!(clip.duration_secs, 0.25);
        assert_eq!(next_event(&rx), CaptureEvent::DurationLimitReached);
        assert!(!engine.is_clip_open());

        // nothing left in the budget
        let (tx, _rx) = mpsc::channel();
        assert!(matches!(
            engine.start_clip(EventSender::new(0, tx)),
            Err(CaptureError::ClipFailed(_))
        ));

        engine.remove_all_clips().unwrap();
        fs::remove_dir_all(engine.working_dir()).ok();
    }

    #[test]
    fn merge_concatenates_clips() {
        let mut engine = engine("merge", 30.0);
        let (tx, rx) = mpsc::channel();
        let sender = EventSender::new(2, tx);
        let first = record(&mut engine, &sender);
        let second = record(&mut engine, &sender);
        while rx.try_recv().is_ok() {}

        engine
            .merge_clips(&[first.clone(), second.clone()], ExportPreset::HighestQuality, sender)
            .unwrap();
        let envelope = loop {
            let envelope = rx.recv_timeout(WAIT).unwrap();
            if matches!(envelope.event, CaptureEvent::MergeFinished(_)) {
                break envelope;
            }
        };
        assert_eq!(envelope.generation, 2);
        let merged = match envelope.event {
            CaptureEvent::MergeFinished(Ok(path)) => path,
            other => panic!("unexpected event: {:?}", other),
        };

        let expected = clip_format::probe(&first.file_path).unwrap().frame_count
            + clip_format::probe(&second.file_path).unwrap().frame_count;
        assert_eq!(clip_format::probe(&merged).unwrap().frame_count, expected);
        assert!(first.file_path.exists() && second.file_path.exists());

        engine.remove_all_clips().unwrap();
        assert!(!merged.exists());
        fs::remove_dir_all(engine.working_dir()).ok();
    }

    fn merged_outputs(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.to_string_lossy().contains("merged_"))
            .collect()
    }

    #[test]
    fn remove_all_clips_does_not_wait_for_running_merge() {
        let mut engine = engine("merge-cancel", 30.0);
        let big_frame = vec![7u8; 1 << 20];
        let inputs: Vec<Clip> = ["a", "b"]
            .iter()
            .map(|name| {
                let path = engine.working_dir().join(format!("{}.nlclip", name));
                let mut writer = ClipWriter::create(path.clone(), 20).unwrap();
                for _ in 0..40 {
                    writer.write_frame(&big_frame).unwrap();
                }
                writer.finish().unwrap();
                Clip::new(path, 2.0)
            })
            .collect();

        let (tx, rx) = mpsc::channel();
        engine
            .merge_clips(&inputs, ExportPreset::HighestQuality, EventSender::new(0, tx))
            .unwrap();

        let started = std::time::Instant::now();
        engine.remove_all_clips().unwrap();
        assert!(started.elapsed() < Duration::from_millis(250));

        // the merge still reports, and never leaves its output behind
        match rx.recv_timeout(WAIT).unwrap().event {
            CaptureEvent::MergeFinished(_) => {}
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(merged_outputs(engine.working_dir()).is_empty());

        fs::remove_dir_all(engine.working_dir()).ok();
    }

    #[test]
    fn default_frames_follow_encoder_settings() {
        let video = VideoSettings {
            frame_rate: 25,
            bit_rate: 80_000,
            max_key_frame_interval: 4,
            ..VideoSettings::default()
        };
        let source = encoded_frames(&video);

        // 80 kbit/s at 25 fps is 400 bytes per frame
        assert_eq!(source(0).len(), 400);
        assert_eq!(source(0)[8], 1);
        assert_eq!(source(3)[8], 0);
        assert_eq!(source(4)[8], 1);
        assert_eq!(source(5)[..8], 5u64.to_le_bytes());
    }

    #[test]
    fn recorded_frames_use_configured_bit_rate() {
        let mut engine = FsCaptureEngine::new(temp_dir("bit-rate")).with_tick(Duration::from_millis(1));
        let mut settings = settings(30.0);
        settings.video.bit_rate = 8_000;
        engine.configure(&settings).unwrap();
        let (tx, _rx) = mpsc::channel();
        let clip = record(&mut engine, &EventSender::new(0, tx));

        let (_, frames) = clip_format::read_frames(&clip.file_path).unwrap();
        assert!(!frames.is_empty());
        // 8 kbit/s at 20 fps is 50 bytes per frame
        assert!(frames.iter().all(|frame| frame.len() == 50));

        engine.remove_all_clips().unwrap();
        fs::remove_dir_all(engine.working_dir()).ok();
    }

    #[test]
    fn merge_failure_is_reported() {
        let mut engine = engine("merge-fail", 30.0);
        let (tx, rx) = mpsc::channel();
        let missing = Clip::new(engine.working_dir().join("gone.nlclip"), 1.0);

        engine
            .merge_clips(&[missing.clone(), missing], ExportPreset::Passthrough, EventSender::new(0, tx))
            .unwrap();
        match rx.recv_timeout(WAIT).unwrap().event {
            CaptureEvent::MergeFinished(Err(CaptureError::MergeFailed(_))) => {}
            other => panic!("unexpected event: {:?}", other),
        }
        fs::remove_dir_all(engine.working_dir()).ok();
    }

    #[test]
    fn remove_all_clips_deletes_files() {
        let mut engine = engine("remove", 30.0);
        let (tx, _rx) = mpsc::channel();
        let sender = EventSender::new(0, tx);
        let clip = record(&mut engine, &sender);
        assert!(clip.file_path.exists());

        engine.remove_all_clips().unwrap();
        assert!(!clip.file_path.exists());
        assert_eq!(engine.clip_count(), 0);
        approx::assert_relative_eq!(engine.cumulative_duration(), 0.0);

        fs::remove_dir_all(engine.working_dir()).ok();
    }

    #[test]
    fn interrupt_reports_and_closes_clip() {
        let mut engine = engine("interrupt", 30.0);
        let (tx, rx) = mpsc::channel();
        let sender = EventSender::new(0, tx);
        engine.start_clip(sender.clone()).unwrap();
        thread::sleep(Duration::from_millis(20));

        engine.interrupt(&sender).unwrap();
        assert!(!engine.is_clip_open());
        assert_eq!(next_event(&rx), CaptureEvent::Interrupted);
        assert!(matches!(next_event(&rx), CaptureEvent::ClipCompleted(_)));

        engine.remove_all_clips().unwrap();
        fs::remove_dir_all(engine.working_dir()).ok();
    }
}
