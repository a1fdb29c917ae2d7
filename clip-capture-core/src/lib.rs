//! # clip-capture-core
//!
//! Platform-agnostic clip capture core library.
//!
//! Coordinates a recording session made of one or more video clips: starts
//! and stops clips on a capture engine, merges them when there is more than
//! one, hands the finished file to a media library sink, and reports a single
//! outcome per session. Platform backends implement `CaptureEngine` and
//! `MediaLibrarySink` and plug into the generic `ClipCaptureCoordinator`.
//!
//! ## Architecture
//!
//! ```text
//! clip-capture-core (this crate)
//! ├── traits/       ← CaptureEngine, MediaLibrarySink, CoordinatorDelegate
//! ├── models/       ← Clip, Session, CaptureOutcome, CoordinatorState, CaptureError, config
//! ├── session/      ← ClipCaptureCoordinator, event envelopes
//! └── storage/      ← checksums, metadata sidecars
//! ```

pub mod models;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::clip::Clip;
pub use models::config::{
    AudioSettings, CaptureSettings, CoordinatorConfig, ExportPreset, ScalingMode, VideoCodec,
    VideoSettings,
};
pub use models::error::CaptureError;
pub use models::outcome::{CaptureOutcome, FailureReason, SavedAsset, SavedVideo};
pub use models::session::Session;
pub use models::state::{CoordinatorState, FinalizeStage};
pub use session::coordinator::ClipCaptureCoordinator;
pub use session::events::{CaptureEvent, Envelope, EventSender};
pub use storage::metadata::VideoMetadata;
pub use traits::capture_engine::CaptureEngine;
pub use traits::coordinator_delegate::CoordinatorDelegate;
pub use traits::media_sink::MediaLibrarySink;
