//! Error types for the `looking-glass` crate.
//!
//! This module defines [`GridError`], the unified error type returned by all
//! fallible operations in the crate. Variants carry the offending path or
//! grid parameters so a caller can report the problem without extra logging.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `looking-glass` operations.
///
/// Every public function that can fail returns `Result<T, GridError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GridError {
    /// The input could not be opened as a decodable video.
    #[error("Failed to open video at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened but contains no video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The grid parameters cannot produce a canvas.
    ///
    /// Raised before any decoding work begins.
    #[error("Invalid grid spec: {0}")]
    InvalidGridSpec(String),

    /// The video produced no frames and the empty-video policy is
    /// [`EmptyVideoPolicy::Error`](crate::EmptyVideoPolicy::Error).
    #[error("Video yielded no frames (container reported {total_frames})")]
    EmptyVideo {
        /// Frame count the container reported.
        total_frames: i64,
    },

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The finished canvas could not be written to its destination.
    #[error("Failed to write grid image to {path}: {reason}")]
    OutputWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while resizing or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for GridError {
    fn from(error: FfmpegError) -> Self {
        GridError::FfmpegError(error.to_string())
    }
}
