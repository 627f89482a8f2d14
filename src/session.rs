//! Video sessions: one frame source plus its cache.
//!
//! [`VideoSession`] owns a [`FrameSource`] and a [`FrameCache`] for as long
//! as a video is open. Batch requests are validated up front, split into
//! cache hits and misses, and the misses are decoded in ascending order so
//! the decoder moves forward through the file. Results always come back in
//! the order (and nesting) they were requested in, duplicates included.
//!
//! Dropping the session releases the source on every exit path; there is no
//! separate close step to forget.
//!
//! # Example
//!
//! ```
//! use shotframes::{PositionSpec, SessionOptions, SyntheticSource, VideoSession};
//!
//! let mut session = VideoSession::new(SyntheticSource::new(200, 25.0), &SessionOptions::new());
//!
//! let frames = session.fetch_many(&[40, 10, 40])?;
//! assert_eq!(frames[0].position(), 40);
//! assert_eq!(frames[1].position(), 10);
//! assert_eq!(frames[2].position(), 40);
//!
//! // Only the two distinct positions were decoded, lowest first.
//! assert_eq!(session.source().decode_log(), &[10, 40]);
//! # Ok::<(), shotframes::ShotFramesError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::cache::{CacheStats, FrameCache};
use crate::config::SessionOptions;
use crate::decoder::FfmpegSource;
use crate::error::ShotFramesError;
use crate::frame::{FrameBuffer, FrameData};
use crate::position::{Nested, PositionSpec};
use crate::source::{FrameSource, VideoInfo};

/// Counters accumulated over a session's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Batch requests served.
    pub batches: u64,
    /// Positions requested, counting duplicates.
    pub positions_requested: u64,
    /// Frames decoded by the source.
    pub frames_decoded: u64,
    /// Times a decode had to move backwards from the previous one.
    pub seek_reversals: u64,
    /// Cache counters.
    pub cache: CacheStats,
}

/// Decode order for the cache misses of one batch.
///
/// Misses are deduplicated and sorted ascending, so the plan contains at
/// most one reversal: the first position, if it lies at or before where the
/// source last decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekPlan {
    order: Vec<u64>,
    reversals: u64,
}

impl SeekPlan {
    /// Plan decoding `misses` given the last decoded position.
    pub fn new<I>(misses: I, last_decoded: Option<u64>) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut order: Vec<u64> = misses.into_iter().collect();
        order.sort_unstable();
        order.dedup();
        let reversals = count_reversals(&order, last_decoded);
        Self { order, reversals }
    }

    /// Positions to decode, ascending.
    pub fn positions(&self) -> &[u64] {
        &self.order
    }

    /// Backward moves this plan will make.
    pub fn reversals(&self) -> u64 {
        self.reversals
    }

    /// Returns `true` if nothing needs decoding.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Count how many times decoding `positions` in the given order moves to a
/// position at or before the previous one, starting from `start`.
pub fn count_reversals(positions: &[u64], start: Option<u64>) -> u64 {
    let mut previous = start;
    let mut reversals = 0;
    for &position in positions {
        if previous.is_some_and(|last| position <= last) {
            reversals += 1;
        }
        previous = Some(position);
    }
    reversals
}

/// An open video: a frame source plus its frame cache.
///
/// Not meant to be shared between threads; open one session per worker.
pub struct VideoSession<S: FrameSource> {
    source: S,
    cache: FrameCache,
    stats: SessionStats,
    last_decoded: Option<u64>,
}

impl VideoSession<FfmpegSource> {
    /// Open a video file with FFmpeg.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`FfmpegSource::open`].
    pub fn open<P: AsRef<Path>>(path: P, options: &SessionOptions) -> Result<Self, ShotFramesError> {
        let source = FfmpegSource::open(path, options)?;
        Ok(Self::new(source, options))
    }
}

impl<S: FrameSource> VideoSession<S> {
    /// Start a session over an already opened source.
    pub fn new(source: S, options: &SessionOptions) -> Self {
        log::debug!(
            "Starting session for {} ({:?})",
            source.info().identifier,
            options.cache_policy(),
        );
        Self {
            source,
            cache: FrameCache::new(options.cache_policy()),
            stats: SessionStats::default(),
            last_decoded: None,
        }
    }

    /// Attributes of the open video.
    pub fn info(&self) -> &VideoInfo {
        self.source.info()
    }

    /// Number of frames in the open video.
    pub fn total_frames(&self) -> u64 {
        self.source.info().total_frames
    }

    /// Frames per second of the open video.
    pub fn frames_per_second(&self) -> f64 {
        self.source.info().frames_per_second
    }

    /// Borrow the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Borrow the frame cache.
    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    /// Drop every cached frame.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            cache: self.cache.stats(),
            ..self.stats
        }
    }

    /// Fetch a single frame.
    ///
    /// # Errors
    ///
    /// See [`fetch_many`](VideoSession::fetch_many).
    pub fn fetch(&mut self, position: u64) -> Result<FrameData, ShotFramesError> {
        let mut frames = self.fetch_many(&[position])?;
        frames.pop().ok_or_else(|| {
            ShotFramesError::DecodeError(format!("No frame produced for position {position}"))
        })
    }

    /// Fetch frames for `positions`, returned in the same order.
    ///
    /// Every position is validated before anything is decoded. Repeated
    /// positions produce repeated results that share one decoded buffer.
    ///
    /// # Errors
    ///
    /// - [`ShotFramesError::PositionOutOfRange`] naming the first position
    ///   outside `[0, total_frames)`; nothing is decoded.
    /// - The source's decode error if any frame fails; no partial result is
    ///   returned.
    pub fn fetch_many(&mut self, positions: &[u64]) -> Result<Vec<FrameData>, ShotFramesError> {
        let total_frames = self.total_frames();
        if let Some(&position) = positions.iter().find(|&&position| position >= total_frames) {
            return Err(ShotFramesError::PositionOutOfRange {
                position,
                total_frames,
            });
        }

        let mut resolved: HashMap<u64, FrameBuffer> = HashMap::with_capacity(positions.len());
        let mut seen = HashSet::with_capacity(positions.len());
        let mut misses = Vec::new();
        for &position in positions {
            if !seen.insert(position) {
                continue;
            }
            match self.cache.get(position) {
                Some(buffer) => {
                    resolved.insert(position, buffer);
                }
                None => misses.push(position),
            }
        }

        let plan = SeekPlan::new(misses, self.last_decoded);
        log::debug!(
            "Batch of {} positions: {} cached, {} to decode, {} reversal(s)",
            positions.len(),
            resolved.len(),
            plan.positions().len(),
            plan.reversals(),
        );

        self.stats.batches += 1;
        self.stats.positions_requested += positions.len() as u64;
        self.stats.seek_reversals += plan.reversals();

        for &position in plan.positions() {
            let buffer = self.source.decode_at(position)?;
            self.last_decoded = Some(position);
            self.stats.frames_decoded += 1;
            self.cache.put(position, buffer.clone());
            resolved.insert(position, buffer);
        }

        let frames_per_second = self.frames_per_second();
        positions
            .iter()
            .map(|&position| {
                resolved
                    .get(&position)
                    .map(|buffer| {
                        FrameData::new(
                            buffer.clone(),
                            position,
                            crate::utilities::position_to_seconds(position, frames_per_second),
                        )
                    })
                    .ok_or_else(|| {
                        ShotFramesError::DecodeError(format!(
                            "No frame produced for position {position}"
                        ))
                    })
            })
            .collect()
    }

    /// Fetch a nested position spec, returning frames with the same nesting.
    ///
    /// # Errors
    ///
    /// [`ShotFramesError::InvalidPosition`] for a negative leaf, otherwise
    /// the errors of [`fetch_many`](VideoSession::fetch_many).
    pub fn fetch_spec(&mut self, spec: &PositionSpec) -> Result<Nested<FrameData>, ShotFramesError> {
        let (flat, shape) = spec.resolve()?;
        let frames = self.fetch_many(&flat)?;
        shape.rebuild(frames)
    }

    /// Fetch `start..=end` stepping by `step`, see
    /// [`expand_range`](crate::expand_range).
    ///
    /// # Errors
    ///
    /// [`ShotFramesError::InvalidRange`] for a malformed range, otherwise the
    /// errors of [`fetch_many`](VideoSession::fetch_many).
    pub fn fetch_range(
        &mut self,
        start: i64,
        end: i64,
        step: i64,
    ) -> Result<Vec<FrameData>, ShotFramesError> {
        let positions = crate::range::expand_range(start, end, step)?;
        self.fetch_many(&positions)
    }

    /// Fetch several ranges with a shared step, concatenated in order.
    ///
    /// # Errors
    ///
    /// See [`fetch_range`](VideoSession::fetch_range).
    pub fn fetch_ranges(
        &mut self,
        ranges: &[(i64, i64)],
        step: i64,
    ) -> Result<Vec<FrameData>, ShotFramesError> {
        let positions = crate::range::expand_ranges(ranges, step)?;
        self.fetch_many(&positions)
    }

    /// Fetch the frames within `window_size` of `center`, clamped to the
    /// video, see [`expand_window`](crate::expand_window). A window entirely
    /// outside the video returns no frames.
    ///
    /// # Errors
    ///
    /// Returns the source's decode errors.
    pub fn fetch_window(
        &mut self,
        center: u64,
        window_size: u64,
    ) -> Result<Vec<FrameData>, ShotFramesError> {
        let positions = crate::range::expand_window(center, window_size, self.total_frames());
        self.fetch_many(&positions)
    }

    /// Fetch windows around several centres, concatenated in order.
    ///
    /// # Errors
    ///
    /// See [`fetch_window`](VideoSession::fetch_window).
    pub fn fetch_windows(
        &mut self,
        centers: &[u64],
        window_size: u64,
    ) -> Result<Vec<FrameData>, ShotFramesError> {
        let positions = crate::range::expand_windows(centers, window_size, self.total_frames());
        self.fetch_many(&positions)
    }

    /// End the session, returning its final counters.
    pub fn close(self) -> SessionStats {
        self.stats()
    }
}

impl<S: FrameSource> Drop for VideoSession<S> {
    fn drop(&mut self) {
        let stats = self.stats();
        log::debug!(
            "Closing session for {}: {} decoded, {} cache hits, {} reversal(s)",
            self.source.info().identifier,
            stats.frames_decoded,
            stats.cache.hits,
            stats.seek_reversals,
        );
    }
}
