//! Media library sink that keeps albums as directories.
//!
//! `library_root/<album title>/<asset id>.<ext>` plus a JSON metadata
//! sidecar per asset. The album directory is created on first save.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use clip_capture_core::models::config::VideoCodec;
use clip_capture_core::models::error::CaptureError;
use clip_capture_core::models::outcome::SavedAsset;
use clip_capture_core::session::events::EventSender;
use clip_capture_core::storage::checksum::sha256_file;
use clip_capture_core::storage::metadata::{self, VideoMetadata};
use clip_capture_core::traits::media_sink::MediaLibrarySink;

pub const DEFAULT_ALBUM_TITLE: &str = "NextLevel";

const METADATA_SUFFIX: &str = ".metadata.json";

/// Saves finished videos into an album directory on a background thread.
pub struct AlbumDirectorySink {
    library_root: PathBuf,
    album_title: String,
    codec: Option<VideoCodec>,
    save_handles: Vec<thread::JoinHandle<()>>,
}

impl AlbumDirectorySink {
    pub fn new(library_root: impl Into<PathBuf>) -> Self {
        Self::with_album(library_root, DEFAULT_ALBUM_TITLE)
    }

    pub fn with_album(library_root: impl Into<PathBuf>, album_title: impl Into<String>) -> Self {
        Self {
            library_root: library_root.into(),
            album_title: album_title.into(),
            codec: None,
            save_handles: Vec::new(),
        }
    }

    /// Codec recorded in each asset's metadata.
    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn album_dir(&self) -> PathBuf {
        self.library_root.join(&self.album_title)
    }

    /// Metadata of every asset in the album, oldest first.
    ///
    /// Assets are found through their sidecars, so a file whose save is
    /// still running, or anything else dropped into the album, is skipped.
    pub fn list_assets(&self) -> Result<Vec<VideoMetadata>, CaptureError> {
        let dir = self.album_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&dir)
            .map_err(|e| CaptureError::StorageError(format!("failed to read album: {}", e)))?;

        let mut assets = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| CaptureError::StorageError(format!("failed to read album: {}", e)))?
                .path();
            let name = path.to_string_lossy();
            let Some(video) = name.strip_suffix(METADATA_SUFFIX) else {
                continue;
            };
            match metadata::read_metadata(Path::new(video)) {
                Ok(asset) => assets.push(asset),
                Err(e) => log::warn!("Skipping unreadable sidecar {}: {}", path.display(), e),
            }
        }
        assets.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(assets)
    }

    /// Block until every save started so far has reported back.
    pub fn wait_idle(&mut self) {
        for handle in self.save_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl MediaLibrarySink for AlbumDirectorySink {
    fn save(&mut self, file_path: &Path, events: EventSender) -> Result<(), CaptureError> {
        if !file_path.is_file() {
            return Err(CaptureError::SaveFailed(format!(
                "no video at {}",
                file_path.display()
            )));
        }

        let source = file_path.to_path_buf();
        let album_dir = self.album_dir();
        let album_title = self.album_title.clone();
        let codec = self.codec;

        let handle = thread::Builder::new()
            .name("library-save".into())
            .spawn(move || {
                let result = persist(&source, &album_dir, &album_title, codec);
                if let Err(ref e) = result {
                    log::error!("Failed to save {} to album: {}", source.display(), e);
                }
                events.save_finished(result);
            })
            .map_err(|e| CaptureError::SaveFailed(format!("failed to spawn save: {}", e)))?;

        self.save_handles.retain(|h| !h.is_finished());
        self.save_handles.push(handle);
        Ok(())
    }
}

impl Drop for AlbumDirectorySink {
    fn drop(&mut self) {
        self.wait_idle();
    }
}

fn persist(
    source: &Path,
    album_dir: &Path,
    album_title: &str,
    codec: Option<VideoCodec>,
) -> Result<SavedAsset, CaptureError> {
    if !album_dir.exists() {
        fs::create_dir_all(album_dir)
            .map_err(|e| CaptureError::SaveFailed(format!("failed to create album: {}", e)))?;
        log::info!("Created album \"{}\"", album_title);
    }

    let asset_id = uuid::Uuid::new_v4().to_string();
    let extension = source
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mov".into());
    let library_path = album_dir.join(format!("{}.{}", asset_id, extension));

    let size_bytes = fs::copy(source, &library_path)
        .map_err(|e| CaptureError::SaveFailed(format!("failed to copy video: {}", e)))?;
    let checksum = sha256_file(&library_path).map_err(|e| CaptureError::SaveFailed(e.to_string()))?;

    let metadata = VideoMetadata {
        id: asset_id.clone(),
        source_file: source.to_string_lossy().into_owned(),
        album: album_title.to_string(),
        checksum: checksum.clone(),
        size_bytes,
        created_at: chrono::Utc::now().to_rfc3339(),
        codec,
    };
    metadata::write_metadata(&metadata, &library_path).map_err(|e| {
        let _ = fs::remove_file(&library_path);
        CaptureError::SaveFailed(e.to_string())
    })?;

    log::info!("Saved {} to album \"{}\"", library_path.display(), album_title);
    Ok(SavedAsset {
        asset_id,
        library_path,
        checksum,
    })
}
