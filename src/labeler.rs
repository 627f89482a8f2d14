//! Per-frame shot labels.
//!
//! [`label`] assigns each frame position of a window one of three classes
//! relative to a [`ShotBoundary`]: still in the previous shot, inside the
//! transition, or already in the next shot.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::annotation::ShotBoundary;

/// Class of a frame relative to a shot boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ShotLabel {
    /// `position <= boundary.from`.
    PreviousShot = 0,
    /// `boundary.from < position < boundary.to`.
    Transition = 1,
    /// `position >= boundary.to`.
    NextShot = 2,
}

impl ShotLabel {
    /// Classify one position.
    pub fn for_position(position: u64, boundary: &ShotBoundary) -> Self {
        if position <= boundary.from() {
            ShotLabel::PreviousShot
        } else if position >= boundary.to() {
            ShotLabel::NextShot
        } else {
            ShotLabel::Transition
        }
    }

    /// Numeric class index (`0`, `1`, or `2`).
    pub fn index(self) -> u8 {
        self as u8
    }
}

impl Display for ShotLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            ShotLabel::PreviousShot => "previous",
            ShotLabel::Transition => "transition",
            ShotLabel::NextShot => "next",
        };
        f.write_str(name)
    }
}

/// Label every position against `boundary`. Same length and order as
/// `positions`.
///
/// # Example
///
/// ```
/// use shotframes::{ShotBoundary, label};
///
/// let boundary = ShotBoundary::new(131, 134)?;
/// let labels: Vec<u8> = label(&[129, 130, 131, 132, 133, 134, 135], &boundary)
///     .into_iter()
///     .map(|label| label.index())
///     .collect();
/// assert_eq!(labels, vec![0, 0, 0, 1, 1, 2, 2]);
/// # Ok::<(), shotframes::ShotFramesError>(())
/// ```
pub fn label(positions: &[u64], boundary: &ShotBoundary) -> Vec<ShotLabel> {
    positions
        .iter()
        .map(|&position| ShotLabel::for_position(position, boundary))
        .collect()
}

/// Frame positions of a training window and their labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    positions: Vec<u64>,
    labels: Vec<ShotLabel>,
    boundary: ShotBoundary,
}

impl Sequence {
    /// Label `positions` against `boundary`.
    pub fn new(positions: Vec<u64>, boundary: ShotBoundary) -> Self {
        let labels = label(&positions, &boundary);
        Self {
            positions,
            labels,
            boundary,
        }
    }

    /// Frame positions, ascending.
    pub fn positions(&self) -> &[u64] {
        &self.positions
    }

    /// One label per position.
    pub fn labels(&self) -> &[ShotLabel] {
        &self.labels
    }

    /// Labels as class indices, ready for a collator.
    pub fn label_indices(&self) -> Vec<u8> {
        self.labels.iter().map(|label| label.index()).collect()
    }

    /// The boundary the labels are relative to.
    pub fn boundary(&self) -> &ShotBoundary {
        &self.boundary
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` for an empty window.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// How many frames carry each label, indexed by [`ShotLabel::index`].
    pub fn label_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for label in &self.labels {
            counts[label.index() as usize] += 1;
        }
        counts
    }
}
