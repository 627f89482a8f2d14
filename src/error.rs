//! Error types for the `shotframes` crate.
//!
//! This module defines [`ShotFramesError`], the unified error type returned by
//! every fallible operation in the crate. Variants carry the offending
//! position, range, or video identifier so a failure can be diagnosed without
//! extra logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `shotframes` operations.
///
/// No operation in the crate retries or swallows an error: each one surfaces
/// to the immediate caller of the failing operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShotFramesError {
    /// A position specification contained a malformed leaf.
    #[error("Invalid position {value}: {reason}")]
    InvalidPosition {
        /// Textual rendering of the rejected leaf.
        value: String,
        /// Why the leaf was rejected.
        reason: String,
    },

    /// A requested frame position is outside `[0, total_frames)`.
    #[error("Position {position} is out of range (video has {total_frames} frames)")]
    PositionOutOfRange {
        /// The position that was requested.
        position: u64,
        /// The total number of frames in the video.
        total_frames: u64,
    },

    /// A range specification was malformed.
    #[error("Invalid range: start {start}, end {end}, step {step}")]
    InvalidRange {
        /// Start of the range.
        start: i64,
        /// End of the range.
        end: i64,
        /// Step between positions.
        step: i64,
    },

    /// A video has fewer shots than the configured minimum.
    #[error("Video {identifier} has {shots} shots, at least {min_shots} required")]
    InsufficientShots {
        /// Identifier of the rejected video.
        identifier: String,
        /// Number of shots the video has.
        shots: usize,
        /// Minimum number of shots required.
        min_shots: usize,
    },

    /// A video has no shot boundaries to build a window around.
    #[error("Video {identifier} has no shot boundaries")]
    NoShotBoundaries {
        /// Identifier of the rejected video.
        identifier: String,
    },

    /// A frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    DecodeError(String),

    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to the opener.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// A sampled window spans more frames than the video has.
    #[error("Sequence spans {span} frames but the video only has {total_frames}")]
    SequenceExceedsVideo {
        /// Number of frames covered from the first to the last position.
        span: u64,
        /// The total number of frames in the video.
        total_frames: u64,
    },

    /// A shape was rebuilt from the wrong number of values.
    #[error("Shape expects {expected} values, got {actual}")]
    ShapeMismatch {
        /// Number of leaves in the shape.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A shot boundary does not satisfy `from < to`.
    #[error("Invalid shot boundary: from ({from}) must be less than to ({to})")]
    InvalidBoundary {
        /// Last frame of the preceding shot.
        from: u64,
        /// First frame of the following shot.
        to: u64,
    },

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A dataset index is past the end of the sequence index.
    #[error("Sequence index {index} is out of range (dataset has {len} sequences)")]
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// Number of sequences in the dataset.
        len: usize,
    },

    /// An I/O error occurred while reading files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for ShotFramesError {
    fn from(error: FfmpegError) -> Self {
        ShotFramesError::FfmpegError(error.to_string())
    }
}

impl ShotFramesError {
    /// Returns `true` for failures of the underlying frame source: the file
    /// could not be opened, has no video, or a frame failed to decode.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            ShotFramesError::DecodeError(_)
                | ShotFramesError::FileOpen { .. }
                | ShotFramesError::NoVideoStream
                | ShotFramesError::FfmpegError(_)
        )
    }
}
