//! Shot-boundary annotations.
//!
//! A [`VideoAnnotation`] is the per-video record an annotation source
//! provides: the frame count, the frame rate, and the ordered list of
//! [`ShotBoundary`] cuts in frame-index space. Reading these records from
//! disk is left to the caller.

use crate::error::ShotFramesError;

/// A cut between two shots.
///
/// Frames `<= from` belong to the preceding shot, frames `>= to` to the
/// following shot, and frames strictly between are transition frames. An
/// instant cut has `to == from + 1` and no transition frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShotBoundary {
    from: u64,
    to: u64,
}

impl ShotBoundary {
    /// Create a boundary.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::InvalidBoundary`] unless `from < to`.
    pub fn new(from: u64, to: u64) -> Result<Self, ShotFramesError> {
        if from >= to {
            return Err(ShotFramesError::InvalidBoundary { from, to });
        }
        Ok(Self { from, to })
    }

    /// Last frame of the preceding shot.
    pub fn from(&self) -> u64 {
        self.from
    }

    /// First frame of the following shot.
    pub fn to(&self) -> u64 {
        self.to
    }

    /// `(from + to) / 2`, rounded down.
    pub fn midpoint(&self) -> u64 {
        self.from + (self.to - self.from) / 2
    }

    /// Number of transition frames strictly between `from` and `to`.
    pub fn transition_len(&self) -> u64 {
        self.to - self.from - 1
    }

    /// Returns `true` for a hard cut with no transition frames.
    pub fn is_instant(&self) -> bool {
        self.transition_len() == 0
    }
}

/// Annotation record for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAnnotation {
    /// Identifier the frame source is opened with (e.g. a file name).
    pub identifier: String,
    /// Number of frames in the video.
    pub total_frames: u64,
    /// Frames per second.
    pub frames_per_second: f64,
    /// Cuts, in ascending frame order.
    pub boundaries: Vec<ShotBoundary>,
}

impl VideoAnnotation {
    /// Create a record.
    pub fn new(
        identifier: impl Into<String>,
        total_frames: u64,
        frames_per_second: f64,
        boundaries: Vec<ShotBoundary>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            total_frames,
            frames_per_second,
            boundaries,
        }
    }

    /// Build a record from raw `(from, to)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::InvalidBoundary`] for the first pair that
    /// is not strictly increasing.
    pub fn from_pairs(
        identifier: impl Into<String>,
        total_frames: u64,
        frames_per_second: f64,
        pairs: &[(u64, u64)],
    ) -> Result<Self, ShotFramesError> {
        let boundaries = pairs
            .iter()
            .map(|&(from, to)| ShotBoundary::new(from, to))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(identifier, total_frames, frames_per_second, boundaries))
    }

    /// Number of shots: one more than the number of cuts.
    pub fn shot_count(&self) -> usize {
        self.boundaries.len() + 1
    }
}
