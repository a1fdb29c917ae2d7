//! # clip-capture-fs
//!
//! Filesystem backend for clip-capture-kit.
//!
//! Provides:
//! - `FsCaptureEngine` — simulated camera recorder writing clip files on a worker thread
//! - `AlbumDirectorySink` — media library kept as album directories with metadata sidecars
//! - `clip_format` — the frame container both of them read and write
//!
//! ## Usage
//! ```no_run
//! use std::time::Duration;
//!
//! use clip_capture_core::{ClipCaptureCoordinator, CoordinatorConfig};
//! use clip_capture_fs::{AlbumDirectorySink, FsCaptureEngine};
//!
//! let engine = FsCaptureEngine::new("/tmp/clips");
//! let sink = AlbumDirectorySink::new("/tmp/library");
//! let mut coordinator = ClipCaptureCoordinator::new(engine, sink, CoordinatorConfig::default())?;
//!
//! coordinator.begin_recording()?;
//! std::thread::sleep(Duration::from_secs(2));
//! coordinator.end_recording()?;
//! coordinator.finalize_session()?;
//! let outcome = coordinator.wait_for_outcome(Duration::from_secs(10));
//! # Ok::<(), clip_capture_core::CaptureError>(())
//! ```

pub mod album_sink;
pub mod clip_format;
pub mod fs_engine;

pub use album_sink::{AlbumDirectorySink, DEFAULT_ALBUM_TITLE};
pub use clip_format::{ClipFormatError, ClipHeader};
pub use fs_engine::{counting_frames, encoded_frames, FrameSource, FsCaptureEngine};
