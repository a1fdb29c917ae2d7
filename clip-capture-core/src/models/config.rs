use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Export quality used when merging clips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPreset {
    #[default]
    HighestQuality,
    MediumQuality,
    LowQuality,
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoCodec {
    Hevc,
    H264,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingMode {
    ResizeAspectFill,
    ResizeAspect,
    Resize,
}

/// Encoder settings handed to the capture engine.
///
/// The coordinator only validates these and passes them on through
/// `CaptureEngine::configure`; how each one is honoured is up to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Capture frame rate in frames per second (default: 60).
    pub frame_rate: u32,

    /// Target bit rate in bits per second (default: 15 Mbps).
    pub bit_rate: u32,

    /// Maximum number of frames between key frames (default: 30).
    pub max_key_frame_interval: u32,

    pub codec: VideoCodec,

    /// How frames are fitted to the output size. Engines without a preview
    /// layer ignore it.
    pub scaling_mode: ScalingMode,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            bit_rate: 15_000_000,
            max_key_frame_interval: 30,
            codec: VideoCodec::Hevc,
            scaling_mode: ScalingMode::ResizeAspectFill,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Target bit rate in bits per second (default: 96 kbps). Passed through
    /// to engines that record audio.
    pub bit_rate: u32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self { bit_rate: 96_000 }
    }
}

/// Everything the capture engine needs to record a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    pub max_duration_secs: f64,
    pub video: VideoSettings,
    pub audio: AudioSettings,
}

/// Configuration for a `ClipCaptureCoordinator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Maximum cumulative duration of a session in seconds (default: 12).
    pub max_duration_secs: f64,

    /// Preset used when more than one clip has to be merged.
    pub merge_preset: ExportPreset,

    /// Finalize automatically when the engine reports the duration cap
    /// (default: true).
    pub auto_finalize_on_limit: bool,

    pub video: VideoSettings,

    pub audio: AudioSettings,
}

impl CoordinatorConfig {
    pub fn validate(&self) -> Result<(), CaptureError> {
        if !self.max_duration_secs.is_finite() || self.max_duration_secs <= 0.0 {
            return Err(CaptureError::ConfigurationFailed(format!(
                "max duration must be positive, got {}",
                self.max_duration_secs
            )));
        }
        if self.video.frame_rate == 0 {
            return Err(CaptureError::ConfigurationFailed("frame rate must be positive".into()));
        }
        if self.video.bit_rate == 0 || self.audio.bit_rate == 0 {
            return Err(CaptureError::ConfigurationFailed("bit rates must be positive".into()));
        }
        if self.video.max_key_frame_interval == 0 {
            return Err(CaptureError::ConfigurationFailed(
                "key frame interval must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::ConfigurationFailed(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            max_duration_secs: self.max_duration_secs,
            video: self.video.clone(),
            audio: self.audio.clone(),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 12.0,
            merge_preset: ExportPreset::default(),
            auto_finalize_on_limit: true,
            video: VideoSettings::default(),
            audio: AudioSettings::default(),
        }
    }
}
