//! Training-window sampling around shot boundaries.
//!
//! [`SequenceSampler`] picks a boundary of a video uniformly at random,
//! jitters the window start by a random offset, and returns
//! `sequence_length` positions spaced `stride` apart. A window that would
//! run off either end of the video is shifted back inside it, so every
//! sample has exactly `sequence_length` valid positions.
//!
//! The random source is injected, so a seeded sampler is fully
//! reproducible.
//!
//! # Example
//!
//! ```
//! use shotframes::{SamplerConfig, SequenceSampler, VideoAnnotation};
//!
//! let video = VideoAnnotation::from_pairs("clip.mp4", 500, 25.0, &[(131, 132), (300, 310)])?;
//! let config = SamplerConfig::new().with_sequence_length(8).with_min_shots(2);
//! let mut sampler = SequenceSampler::seeded(config, 7)?;
//!
//! let window = sampler.sample(&video)?;
//! assert_eq!(window.positions.len(), 8);
//! # Ok::<(), shotframes::ShotFramesError>(())
//! ```

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::annotation::{ShotBoundary, VideoAnnotation};
use crate::config::{SamplerConfig, WindowAnchor};
use crate::error::ShotFramesError;
use crate::labeler::Sequence;

/// A window chosen by [`SequenceSampler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledWindow {
    /// Index of the chosen boundary in the video's boundary list.
    pub boundary_index: usize,
    /// The chosen boundary.
    pub boundary: ShotBoundary,
    /// Random offset that was applied before clamping.
    pub offset: i64,
    /// Frame positions, ascending, all inside the video.
    pub positions: Vec<u64>,
}

impl SampledWindow {
    /// Label the window against its boundary.
    pub fn into_sequence(self) -> Sequence {
        Sequence::new(self.positions, self.boundary)
    }
}

/// Reject a video with too few shots to sample from.
///
/// # Errors
///
/// - [`ShotFramesError::InsufficientShots`] if the video has fewer than
///   `min_shots` shots.
/// - [`ShotFramesError::NoShotBoundaries`] if it has no boundary to centre
///   a window on, whatever `min_shots` is.
pub fn check_min_shots(video: &VideoAnnotation, min_shots: usize) -> Result<(), ShotFramesError> {
    let shots = video.shot_count();
    if shots < min_shots {
        return Err(ShotFramesError::InsufficientShots {
            identifier: video.identifier.clone(),
            shots,
            min_shots,
        });
    }
    if video.boundaries.is_empty() {
        return Err(ShotFramesError::NoShotBoundaries {
            identifier: video.identifier.clone(),
        });
    }
    Ok(())
}

/// Positions of the window for `boundary` with a fixed `offset`.
///
/// The nominal start is `anchor - (sequence_length / 2) * stride + offset`.
/// If the window would begin before frame 0 or end at or after
/// `total_frames`, it is shifted (never truncated) to fit.
///
/// # Errors
///
/// - [`ShotFramesError::InvalidConfiguration`] if `config` is invalid.
/// - [`ShotFramesError::SequenceExceedsVideo`] if the window is longer than
///   the video, so no shift can make it fit.
pub fn window_positions(
    config: &SamplerConfig,
    boundary: &ShotBoundary,
    total_frames: u64,
    offset: i64,
) -> Result<Vec<u64>, ShotFramesError> {
    config.validate()?;

    let span = config.span();
    if span > total_frames {
        return Err(ShotFramesError::SequenceExceedsVideo { span, total_frames });
    }

    let anchor = match config.anchor() {
        WindowAnchor::From => boundary.from(),
        WindowAnchor::Midpoint => boundary.midpoint(),
        WindowAnchor::To => boundary.to(),
    } as i64;
    let stride = config.stride();
    let lead = (config.sequence_length() / 2) as i64 * stride as i64;
    let latest_start = (total_frames - span) as i64;
    let start = (anchor - lead + offset).clamp(0, latest_start) as u64;

    Ok((0..config.sequence_length() as u64)
        .map(|i| start + i * stride)
        .collect())
}

/// Samples labelled training windows from annotated videos.
pub struct SequenceSampler<R: Rng = StdRng> {
    config: SamplerConfig,
    rng: R,
}

impl SequenceSampler<StdRng> {
    /// A sampler driven by a [`StdRng`] seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::InvalidConfiguration`] if `config` is
    /// invalid.
    pub fn seeded(config: SamplerConfig, seed: u64) -> Result<Self, ShotFramesError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// A sampler seeded from system entropy.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::InvalidConfiguration`] if `config` is
    /// invalid.
    pub fn from_entropy(config: SamplerConfig) -> Result<Self, ShotFramesError> {
        Self::new(config, StdRng::from_entropy())
    }
}

impl<R: Rng> SequenceSampler<R> {
    /// A sampler using `rng` for boundary choice and jitter.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::InvalidConfiguration`] if `config` is
    /// invalid.
    pub fn new(config: SamplerConfig, rng: R) -> Result<Self, ShotFramesError> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    /// The sampling parameters.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Draw an offset uniformly from `-range..=range`.
    pub fn draw_offset(&mut self) -> i64 {
        let range = self.config.random_offset_range() as i64;
        if range == 0 {
            0
        } else {
            self.rng.gen_range(-range..=range)
        }
    }

    /// Sample a window around a uniformly chosen boundary of `video`.
    ///
    /// # Errors
    ///
    /// - [`ShotFramesError::InsufficientShots`] or
    ///   [`ShotFramesError::NoShotBoundaries`] if the video fails the shot
    ///   filter; checked before any randomness is drawn.
    /// - [`ShotFramesError::SequenceExceedsVideo`] if the window cannot fit.
    pub fn sample(&mut self, video: &VideoAnnotation) -> Result<SampledWindow, ShotFramesError> {
        check_min_shots(video, self.config.min_shots())?;
        let index = self.rng.gen_range(0..video.boundaries.len());
        self.sample_boundary(video, index)
    }

    /// Sample a window around a specific boundary of `video`.
    ///
    /// # Errors
    ///
    /// - [`ShotFramesError::InsufficientShots`] or
    ///   [`ShotFramesError::NoShotBoundaries`] if the video fails the shot
    ///   filter.
    /// - [`ShotFramesError::IndexOutOfRange`] if `index` is not a boundary.
    /// - [`ShotFramesError::SequenceExceedsVideo`] if the window cannot fit.
    pub fn sample_boundary(
        &mut self,
        video: &VideoAnnotation,
        index: usize,
    ) -> Result<SampledWindow, ShotFramesError> {
        check_min_shots(video, self.config.min_shots())?;
        let boundary = *video
            .boundaries
            .get(index)
            .ok_or(ShotFramesError::IndexOutOfRange {
                index,
                len: video.boundaries.len(),
            })?;

        let offset = self.draw_offset();
        let positions = window_positions(&self.config, &boundary, video.total_frames, offset)?;
        log::trace!(
            "Sampled {} boundary {index} ({}..{}) offset {offset}: start {:?}",
            video.identifier,
            boundary.from(),
            boundary.to(),
            positions.first(),
        );

        Ok(SampledWindow {
            boundary_index: index,
            boundary,
            offset,
            positions,
        })
    }

    /// Sample a window and label it.
    ///
    /// # Errors
    ///
    /// See [`sample`](SequenceSampler::sample).
    pub fn sample_sequence(&mut self, video: &VideoAnnotation) -> Result<Sequence, ShotFramesError> {
        self.sample(video).map(SampledWindow::into_sequence)
    }
}
