//! Indexed shot-boundary training sequences.
//!
//! [`ShotSequenceDataset`] filters annotated videos, builds a reproducible
//! index of jittered windows around every boundary, and loads any entry as
//! decoded frames plus per-frame labels. Each load opens its own
//! [`VideoSession`] through a [`SourceOpener`] and drops it before
//! returning, so loads are independent of each other.
//!
//! # Example
//!
//! ```no_run
//! use shotframes::{
//!     FfmpegOpener, SamplerConfig, SessionOptions, ShotSequenceDataset, VideoAnnotation,
//! };
//!
//! let videos = vec![VideoAnnotation::from_pairs("clip.mp4", 900, 25.0, &[(131, 132)])?];
//! let options = SessionOptions::new().with_resolution(Some(224), Some(224));
//! let opener = FfmpegOpener::new("videos", options.clone());
//! let dataset = ShotSequenceDataset::new(videos, opener, SamplerConfig::new(), options, 42)?;
//!
//! for index in 0..dataset.len() {
//!     let sample = dataset.load(index)?;
//!     println!("{:?}", sample.sequence.label_indices());
//! }
//! # Ok::<(), shotframes::ShotFramesError>(())
//! ```

use crate::annotation::{ShotBoundary, VideoAnnotation};
use crate::config::{SamplerConfig, SessionOptions};
use crate::error::ShotFramesError;
use crate::frame::FrameData;
use crate::labeler::Sequence;
use crate::sampler::{SequenceSampler, check_min_shots};
use crate::session::VideoSession;
use crate::source::SourceOpener;

/// One entry of the sequence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePlan {
    /// Index into [`ShotSequenceDataset::videos`].
    pub video_index: usize,
    /// Index of the boundary within that video.
    pub boundary_index: usize,
    /// The boundary the window is built around.
    pub boundary: ShotBoundary,
    /// Frame positions to extract, ascending.
    pub positions: Vec<u64>,
}

/// Descriptive record for one index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceInfo {
    /// Video identifier.
    pub identifier: String,
    /// Frames in the video.
    pub total_frames: u64,
    /// Frames per second.
    pub frames_per_second: f64,
    /// Shots in the video.
    pub shot_count: usize,
    /// First position of the window.
    pub sequence_start: u64,
    /// Last position of the window.
    pub sequence_end: u64,
    /// The boundary the window is built around.
    pub boundary: ShotBoundary,
}

/// Decoded frames of a window with their labels.
#[derive(Debug, Clone)]
pub struct LabeledSequence {
    /// One frame per position, in window order.
    pub frames: Vec<FrameData>,
    /// Positions and labels.
    pub sequence: Sequence,
}

/// A reproducible index of labelled windows over a set of videos.
pub struct ShotSequenceDataset<O: SourceOpener> {
    videos: Vec<VideoAnnotation>,
    plans: Vec<SequencePlan>,
    opener: O,
    config: SamplerConfig,
    options: SessionOptions,
}

impl<O: SourceOpener> ShotSequenceDataset<O> {
    /// Filter `annotations` and build the sequence index.
    ///
    /// Videos failing the minimum-shot filter, without boundaries, or whose
    /// source the opener does not [contain](SourceOpener::contains) are
    /// dropped. Each boundary yields
    /// [`effective_variations`](SamplerConfig::effective_variations) windows
    /// with independent jitter drawn from a generator seeded with `seed`.
    /// Boundaries whose window cannot fit inside the video are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::InvalidConfiguration`] if `config` is
    /// invalid.
    pub fn new(
        annotations: Vec<VideoAnnotation>,
        opener: O,
        config: SamplerConfig,
        options: SessionOptions,
        seed: u64,
    ) -> Result<Self, ShotFramesError> {
        config.validate()?;

        let total = annotations.len();
        let videos: Vec<VideoAnnotation> = annotations
            .into_iter()
            .filter(|video| match check_min_shots(video, config.min_shots()) {
                Ok(()) => true,
                Err(error) => {
                    log::debug!("Skipping video: {error}");
                    false
                }
            })
            .filter(|video| {
                let found = opener.contains(&video.identifier);
                if !found {
                    log::debug!("Skipping video {}: source not found", video.identifier);
                }
                found
            })
            .collect();
        log::debug!("{} of {total} videos pass the filters", videos.len());

        let plans = build_plans(&videos, &config, seed)?;
        log::debug!("Built {} sequences", plans.len());

        Ok(Self {
            videos,
            plans,
            opener,
            config,
            options,
        })
    }

    /// Rebuild the index with fresh jitter drawn from `seed`.
    ///
    /// # Errors
    ///
    /// See [`new`](ShotSequenceDataset::new).
    pub fn regenerate(&mut self, seed: u64) -> Result<(), ShotFramesError> {
        self.plans = build_plans(&self.videos, &self.config, seed)?;
        Ok(())
    }

    /// Number of sequences in the index.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Returns `true` if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Videos that passed the filter.
    pub fn videos(&self) -> &[VideoAnnotation] {
        &self.videos
    }

    /// The whole index.
    pub fn plans(&self) -> &[SequencePlan] {
        &self.plans
    }

    /// The sampling parameters.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// One index entry.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::IndexOutOfRange`].
    pub fn plan(&self, index: usize) -> Result<&SequencePlan, ShotFramesError> {
        self.plans.get(index).ok_or(ShotFramesError::IndexOutOfRange {
            index,
            len: self.plans.len(),
        })
    }

    /// Positions and labels of an entry, without decoding anything.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::IndexOutOfRange`].
    pub fn sequence(&self, index: usize) -> Result<Sequence, ShotFramesError> {
        let plan = self.plan(index)?;
        Ok(Sequence::new(plan.positions.clone(), plan.boundary))
    }

    /// Describe an entry.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::IndexOutOfRange`].
    pub fn sequence_info(&self, index: usize) -> Result<SequenceInfo, ShotFramesError> {
        let plan = self.plan(index)?;
        let video = &self.videos[plan.video_index];
        Ok(SequenceInfo {
            identifier: video.identifier.clone(),
            total_frames: video.total_frames,
            frames_per_second: video.frames_per_second,
            shot_count: video.shot_count(),
            sequence_start: plan.positions.first().copied().unwrap_or_default(),
            sequence_end: plan.positions.last().copied().unwrap_or_default(),
            boundary: plan.boundary,
        })
    }

    /// Decode and label an entry.
    ///
    /// Opens a session for the entry's video, fetches every position, and
    /// closes the session before returning, on success or failure.
    ///
    /// # Errors
    ///
    /// - [`ShotFramesError::IndexOutOfRange`] for a bad index.
    /// - The opener's error if the video cannot be opened.
    /// - [`VideoSession::fetch_many`] errors, e.g. when the video has fewer
    ///   frames than its annotation claims.
    pub fn load(&self, index: usize) -> Result<LabeledSequence, ShotFramesError> {
        let plan = self.plan(index)?;
        let video = &self.videos[plan.video_index];

        let source = self.opener.open(&video.identifier)?;
        let mut session = VideoSession::new(source, &self.options);
        let frames = session.fetch_many(&plan.positions)?;

        Ok(LabeledSequence {
            frames,
            sequence: Sequence::new(plan.positions.clone(), plan.boundary),
        })
    }

    /// Load every entry in index order, lazily.
    pub fn iter(&self) -> impl Iterator<Item = Result<LabeledSequence, ShotFramesError>> + '_ {
        (0..self.plans.len()).map(move |index| self.load(index))
    }
}

fn build_plans(
    videos: &[VideoAnnotation],
    config: &SamplerConfig,
    seed: u64,
) -> Result<Vec<SequencePlan>, ShotFramesError> {
    let mut sampler = SequenceSampler::seeded(config.clone(), seed)?;
    let variations = config.effective_variations();
    let mut plans = Vec::new();

    for (video_index, video) in videos.iter().enumerate() {
        for boundary_index in 0..video.boundaries.len() {
            for _ in 0..variations {
                match sampler.sample_boundary(video, boundary_index) {
                    Ok(window) => plans.push(SequencePlan {
                        video_index,
                        boundary_index,
                        boundary: window.boundary,
                        positions: window.positions,
                    }),
                    Err(ShotFramesError::SequenceExceedsVideo { span, total_frames }) => {
                        log::debug!(
                            "Skipping {}: {span}-frame window does not fit in {total_frames} frames",
                            video.identifier,
                        );
                        break;
                    }
                    Err(error) => return Err(error),
                }
            }
        }
    }

    Ok(plans)
}
