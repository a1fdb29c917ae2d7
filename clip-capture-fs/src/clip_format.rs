//! Minimal frame container used for simulated clips.
//!
//! ```text
//! [16-byte header]
//!   0..4   magic "NLCP"
//!   4..6   version (u16 LE, currently 1)
//!   6..8   frame rate (u16 LE, frames per second)
//!   8..12  frame count (u32 LE, patched when the clip is closed)
//!   12..16 reserved (zero)
//! [frame 1: 4-byte LE length | payload]
//! [frame 2: ...]
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

pub const MAGIC: [u8; 4] = *b"NLCP";
pub const VERSION: u16 = 1;
pub const HEADER_LEN: usize = 16;

const FRAME_COUNT_OFFSET: u64 = 8;

#[derive(Debug, Error)]
pub enum ClipFormatError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("not a clip file")]
    BadMagic,

    #[error("unsupported clip version {0}")]
    UnsupportedVersion(u16),

    #[error("frame rate must be positive")]
    ZeroFrameRate,

    #[error("frame rate mismatch: expected {expected} fps, found {found} fps")]
    FrameRateMismatch { expected: u16, found: u16 },

    #[error("clip truncated after {0} frames")]
    Truncated(u32),

    #[error("nothing to merge")]
    Empty,

    #[error("merge cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipHeader {
    pub frame_rate: u16,
    pub frame_count: u32,
}

impl ClipHeader {
    pub fn duration_secs(&self) -> f64 {
        if self.frame_rate == 0 {
            return 0.0;
        }
        f64::from(self.frame_count) / f64::from(self.frame_rate)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4..6].copy_from_slice(&VERSION.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.frame_rate.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.frame_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; HEADER_LEN]) -> Result<Self, ClipFormatError> {
        if bytes[0..4] != MAGIC {
            return Err(ClipFormatError::BadMagic);
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(ClipFormatError::UnsupportedVersion(version));
        }
        let frame_rate = u16::from_le_bytes([bytes[6], bytes[7]]);
        if frame_rate == 0 {
            return Err(ClipFormatError::ZeroFrameRate);
        }
        let frame_count = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        Ok(Self {
            frame_rate,
            frame_count,
        })
    }
}

pub fn read_header<R: Read>(reader: &mut R) -> Result<ClipHeader, ClipFormatError> {
    let mut bytes = [0u8; HEADER_LEN];
    reader.read_exact(&mut bytes).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ClipFormatError::BadMagic,
        _ => ClipFormatError::Io(e),
    })?;
    ClipHeader::from_bytes(&bytes)
}

/// Read the header of the clip at `path`.
pub fn probe(path: &Path) -> Result<ClipHeader, ClipFormatError> {
    let mut file = File::open(path)?;
    read_header(&mut file)
}

/// Overwrite the frame count of a closed clip file.
pub fn patch_frame_count(path: &Path, frame_count: u32) -> Result<(), ClipFormatError> {
    let mut file = OpenOptions::new().write(true).open(path)?;
    file.seek(SeekFrom::Start(FRAME_COUNT_OFFSET))?;
    file.write_all(&frame_count.to_le_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn read_frame<R: Read>(reader: &mut R, index: u32) -> Result<Vec<u8>, ClipFormatError> {
    let mut len = [0u8; 4];
    reader
        .read_exact(&mut len)
        .map_err(|_| ClipFormatError::Truncated(index))?;
    let len = u64::from(u32::from_le_bytes(len));

    // the length comes from the file; only allocate what is actually there
    let mut payload = Vec::new();
    (&mut *reader)
        .take(len)
        .read_to_end(&mut payload)
        .map_err(|_| ClipFormatError::Truncated(index))?;
    if payload.len() as u64 != len {
        return Err(ClipFormatError::Truncated(index));
    }
    Ok(payload)
}

/// Streaming writer for one clip. The frame count is patched on `finish`.
pub struct ClipWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    frame_rate: u16,
    frame_count: u32,
}

impl ClipWriter {
    pub fn create(path: PathBuf, frame_rate: u16) -> Result<Self, ClipFormatError> {
        if frame_rate == 0 {
            return Err(ClipFormatError::ZeroFrameRate);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&path)?);
        let header = ClipHeader {
            frame_rate,
            frame_count: 0,
        };
        writer.write_all(&header.to_bytes())?;
        Ok(Self {
            path,
            writer,
            frame_rate,
            frame_count: 0,
        })
    }

    pub fn write_frame(&mut self, payload: &[u8]) -> Result<(), ClipFormatError> {
        self.writer.write_all(&(payload.len() as u32).to_le_bytes())?;
        self.writer.write_all(payload)?;
        self.frame_count += 1;
        Ok(())
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frame_rate(&self) -> u16 {
        self.frame_rate
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and patch the header. Returns the final header.
    pub fn finish(mut self) -> Result<ClipHeader, ClipFormatError> {
        self.writer.flush()?;
        drop(self.writer);
        patch_frame_count(&self.path, self.frame_count)?;
        Ok(ClipHeader {
            frame_rate: self.frame_rate,
            frame_count: self.frame_count,
        })
    }
}

/// Concatenate clips, in order, into `output`.
///
/// Every input must be a valid clip at the same frame rate. On failure the
/// partial output is removed; inputs are never modified.
pub fn concat(inputs: &[PathBuf], output: &Path) -> Result<ClipHeader, ClipFormatError> {
    concat_cancellable(inputs, output, &AtomicBool::new(false))
}

/// `concat` that gives up with `Cancelled` once `cancel` is set. Checked
/// before every frame.
pub fn concat_cancellable(
    inputs: &[PathBuf],
    output: &Path,
    cancel: &AtomicBool,
) -> Result<ClipHeader, ClipFormatError> {
    let result = concat_inner(inputs, output, cancel);
    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result
}

fn concat_inner(
    inputs: &[PathBuf],
    output: &Path,
    cancel: &AtomicBool,
) -> Result<ClipHeader, ClipFormatError> {
    let first = inputs.first().ok_or(ClipFormatError::Empty)?;
    let frame_rate = probe(first)?.frame_rate;

    // validate everything before writing anything
    for input in inputs {
        let header = probe(input)?;
        if header.frame_rate != frame_rate {
            return Err(ClipFormatError::FrameRateMismatch {
                expected: frame_rate,
                found: header.frame_rate,
            });
        }
    }

    let mut writer = ClipWriter::create(output.to_path_buf(), frame_rate)?;
    for input in inputs {
        let mut reader = BufReader::new(File::open(input)?);
        let header = read_header(&mut reader)?;
        for index in 0..header.frame_count {
            if cancel.load(Ordering::SeqCst) {
                return Err(ClipFormatError::Cancelled);
            }
            let payload = read_frame(&mut reader, index)?;
            writer.write_frame(&payload)?;
        }
    }
    writer.finish()
}

/// Read every frame payload of a clip.
pub fn read_frames(path: &Path) -> Result<(ClipHeader, Vec<Vec<u8>>), ClipFormatError> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = read_header(&mut reader)?;
    let frames = (0..header.frame_count)
        .map(|index| read_frame(&mut reader, index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((header, frames))
}
