//! # shotframes
//!
//! Extract arbitrary, nested sets of frame positions from video files and
//! turn shot-boundary annotations into per-frame training labels.
//!
//! `shotframes` has two halves:
//!
//! - **Frame extraction.** A [`VideoSession`] owns one opened
//!   [`FrameSource`] and a [`FrameCache`]. It accepts flat position lists,
//!   nested [`PositionSpec`]s, ranges, and windows, decodes cache misses in
//!   ascending order so the decoder keeps moving forward, and returns
//!   results in request order and nesting.
//! - **Sequence sampling.** A [`SequenceSampler`] places a fixed-length,
//!   strided window around a randomly chosen [`ShotBoundary`] with bounded
//!   jitter, and [`label`] classifies every frame as previous shot,
//!   transition, or next shot. [`ShotSequenceDataset`] combines both into a
//!   reproducible index of labelled windows.
//!
//! Real files are decoded with FFmpeg via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next); [`SyntheticSource`]
//! provides deterministic in-memory frames for tests.
//!
//! ## Quick Start
//!
//! ### Fetch Nested Positions
//!
//! ```no_run
//! use shotframes::{PositionSpec, SessionOptions, VideoSession};
//!
//! let mut session = VideoSession::open("input.mp4", &SessionOptions::new())?;
//! let spec = PositionSpec::from(vec![vec![10, 11], vec![500, 501]]);
//! let frames = session.fetch_spec(&spec)?;
//! for frame in frames.leaves() {
//!     println!("{} @ {:.3}s", frame.position(), frame.timestamp());
//! }
//! # Ok::<(), shotframes::ShotFramesError>(())
//! ```
//!
//! ### Sample a Labelled Window
//!
//! ```
//! use shotframes::{SamplerConfig, SequenceSampler, VideoAnnotation};
//!
//! let video = VideoAnnotation::from_pairs("clip.mp4", 1000, 25.0, &[(131, 134)])?;
//! let mut sampler = SequenceSampler::seeded(SamplerConfig::new(), 1)?;
//! let sequence = sampler.sample_sequence(&video)?;
//! assert_eq!(sequence.len(), 16);
//! # Ok::<(), shotframes::ShotFramesError>(())
//! ```
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `ShotSequenceDataset::load_parallel()` loads entries on rayon threads, one session per load |
//! | `full`  | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system for
//! `ffmpeg-next` to build.

pub mod annotation;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod labeler;
#[cfg(feature = "rayon")]
mod parallel;
pub mod position;
pub mod range;
pub mod sampler;
pub mod session;
pub mod source;
mod utilities;

pub use annotation::{ShotBoundary, VideoAnnotation};
pub use cache::{CacheStats, FrameCache};
pub use config::{
    CachePolicy, DEFAULT_CACHE_CAPACITY, DEFAULT_SEEK_GAP_THRESHOLD, FrameOutputConfig,
    PixelFormat, SamplerConfig, SessionOptions, WindowAnchor,
};
pub use dataset::{LabeledSequence, SequenceInfo, SequencePlan, ShotSequenceDataset};
pub use decoder::{FfmpegOpener, FfmpegSource};
pub use error::ShotFramesError;
pub use frame::{FrameBuffer, FrameData};
pub use labeler::{Sequence, ShotLabel, label};
pub use position::{Nested, PositionShape, PositionSpec};
pub use range::{expand_range, expand_ranges, expand_window, expand_windows};
pub use sampler::{SampledWindow, SequenceSampler, check_min_shots, window_positions};
pub use session::{SeekPlan, SessionStats, VideoSession, count_reversals};
pub use source::{FrameSource, SourceOpener, SyntheticSource, VideoInfo};
