//! Session and sampling configuration.
//!
//! [`SessionOptions`] controls how a [`VideoSession`](crate::VideoSession)
//! caches and decodes frames; [`SamplerConfig`] controls how training
//! windows are placed around shot boundaries. Both are builders with
//! defaults matching the common training setup.
//!
//! # Example
//!
//! ```
//! use shotframes::{CachePolicy, PixelFormat, SamplerConfig, SessionOptions, WindowAnchor};
//!
//! let options = SessionOptions::new()
//!     .with_cache_policy(CachePolicy::Lru { capacity: 64 })
//!     .with_pixel_format(PixelFormat::Rgb8)
//!     .with_resolution(Some(224), Some(224));
//!
//! let sampler = SamplerConfig::new()
//!     .with_sequence_length(16)
//!     .with_random_offset_range(3)
//!     .with_min_shots(2)
//!     .with_anchor(WindowAnchor::Midpoint);
//! assert!(sampler.validate().is_ok());
//! ```

use ffmpeg_next::format::Pixel;

use crate::error::ShotFramesError;

/// Output pixel format for decoded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8-bit RGB (24 bpp). This is the default.
    #[default]
    Rgb8,
    /// 8-bit RGBA with alpha pre-set to 255 (32 bpp).
    Rgba8,
    /// 8-bit grayscale (8 bpp).
    Gray8,
}

impl PixelFormat {
    /// Map to the corresponding FFmpeg pixel format constant.
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            PixelFormat::Rgb8 => Pixel::RGB24,
            PixelFormat::Rgba8 => Pixel::RGBA,
            PixelFormat::Gray8 => Pixel::GRAY8,
        }
    }

    /// Bytes per pixel in the packed output buffer.
    pub(crate) fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Pixel format and resolution of decoded frames.
///
/// When no dimensions are set the source resolution is used. Setting one
/// dimension together with
/// [`maintain_aspect_ratio`](FrameOutputConfig::maintain_aspect_ratio)
/// computes the other automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutputConfig {
    /// Output pixel format.
    pub pixel_format: PixelFormat,
    /// Target width. `None` keeps the source width.
    pub width: Option<u32>,
    /// Target height. `None` keeps the source height.
    pub height: Option<u32>,
    /// When `true` and only one dimension is specified, the other is
    /// computed to preserve the source aspect ratio.
    pub maintain_aspect_ratio: bool,
}

impl Default for FrameOutputConfig {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Rgb8,
            width: None,
            height: None,
            maintain_aspect_ratio: true,
        }
    }
}

impl FrameOutputConfig {
    /// Resolve the final output dimensions given the source size.
    ///
    /// Returns `(width, height)`.
    pub fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if self.maintain_aspect_ratio && source_width > 0 => {
                let ratio = w as f64 / source_width as f64;
                let h = (source_height as f64 * ratio).round() as u32;
                (w, h.max(1))
            }
            (Some(w), None) => (w, source_height),
            (None, Some(h)) if self.maintain_aspect_ratio && source_height > 0 => {
                let ratio = h as f64 / source_height as f64;
                let w = (source_width as f64 * ratio).round() as u32;
                (w.max(1), h)
            }
            (None, Some(h)) => (source_width, h),
            (None, None) => (source_width, source_height),
        }
    }
}

/// How a session's [`FrameCache`](crate::FrameCache) retains frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Never cache; every request decodes.
    Disabled,
    /// Keep every decoded frame until the session closes.
    Unbounded,
    /// Keep at most `capacity` frames, evicting the least recently used.
    Lru {
        /// Maximum number of cached frames. `0` behaves like `Disabled`.
        capacity: usize,
    },
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy::Lru {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Default number of frames kept by [`CachePolicy::Lru`].
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Default forward gap (in frames) that the FFmpeg source decodes through
/// before it prefers a real seek.
pub const DEFAULT_SEEK_GAP_THRESHOLD: u64 = 30;

/// Options for opening a [`VideoSession`](crate::VideoSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub(crate) cache_policy: CachePolicy,
    pub(crate) frame_output: FrameOutputConfig,
    pub(crate) seek_gap_threshold: u64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionOptions {
    /// Defaults: LRU cache of [`DEFAULT_CACHE_CAPACITY`] frames, RGB8 at the
    /// source resolution, seek gap of [`DEFAULT_SEEK_GAP_THRESHOLD`].
    pub fn new() -> Self {
        Self {
            cache_policy: CachePolicy::default(),
            frame_output: FrameOutputConfig::default(),
            seek_gap_threshold: DEFAULT_SEEK_GAP_THRESHOLD,
        }
    }

    /// Set the cache policy.
    #[must_use]
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Set the output pixel format for decoded frames.
    #[must_use]
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.frame_output.pixel_format = format;
        self
    }

    /// Set a custom output resolution. Pass `None` for either dimension to
    /// keep (or derive) the source value.
    #[must_use]
    pub fn with_resolution(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.frame_output.width = width;
        self.frame_output.height = height;
        self
    }

    /// Control aspect-ratio preservation when only one dimension is set.
    #[must_use]
    pub fn with_maintain_aspect_ratio(mut self, maintain: bool) -> Self {
        self.frame_output.maintain_aspect_ratio = maintain;
        self
    }

    /// Set the complete frame output configuration.
    #[must_use]
    pub fn with_frame_output(mut self, config: FrameOutputConfig) -> Self {
        self.frame_output = config;
        self
    }

    /// Set the forward gap beyond which the decoder seeks instead of
    /// decoding through intermediate frames.
    #[must_use]
    pub fn with_seek_gap_threshold(mut self, frames: u64) -> Self {
        self.seek_gap_threshold = frames;
        self
    }

    /// The cache policy.
    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// The frame output configuration.
    pub fn frame_output(&self) -> &FrameOutputConfig {
        &self.frame_output
    }

    /// The seek gap threshold in frames.
    pub fn seek_gap_threshold(&self) -> u64 {
        self.seek_gap_threshold
    }
}

/// Which frame of a shot boundary a sampled window is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowAnchor {
    /// The last frame of the preceding shot (`boundary.from`).
    #[default]
    From,
    /// `(from + to) / 2`, the middle of the transition.
    Midpoint,
    /// The first frame of the following shot (`boundary.to`).
    To,
}

/// Parameters for placing training windows around shot boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerConfig {
    pub(crate) sequence_length: usize,
    pub(crate) stride: u64,
    pub(crate) random_offset_range: u64,
    pub(crate) min_shots: usize,
    pub(crate) anchor: WindowAnchor,
    pub(crate) variations_per_boundary: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplerConfig {
    /// Defaults: 16 frames, stride 1, offset ±5, at least 1 shot, anchored
    /// on `boundary.from`, 3 jittered windows per boundary.
    pub fn new() -> Self {
        Self {
            sequence_length: 16,
            stride: 1,
            random_offset_range: 5,
            min_shots: 1,
            anchor: WindowAnchor::From,
            variations_per_boundary: 3,
        }
    }

    /// Number of frames per sequence.
    #[must_use]
    pub fn with_sequence_length(mut self, length: usize) -> Self {
        self.sequence_length = length;
        self
    }

    /// Distance in frames between consecutive positions.
    #[must_use]
    pub fn with_stride(mut self, stride: u64) -> Self {
        self.stride = stride;
        self
    }

    /// Maximum jitter applied to the window start, in frames either way.
    #[must_use]
    pub fn with_random_offset_range(mut self, range: u64) -> Self {
        self.random_offset_range = range;
        self
    }

    /// Minimum number of shots a video needs to be sampled from.
    #[must_use]
    pub fn with_min_shots(mut self, min_shots: usize) -> Self {
        self.min_shots = min_shots;
        self
    }

    /// Which boundary frame the window is centred on.
    #[must_use]
    pub fn with_anchor(mut self, anchor: WindowAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// How many jittered windows a dataset index builds per boundary.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_variations_per_boundary(mut self, variations: usize) -> Self {
        self.variations_per_boundary = variations.max(1);
        self
    }

    /// Number of frames per sequence.
    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Distance in frames between consecutive positions.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Maximum jitter in frames either way.
    pub fn random_offset_range(&self) -> u64 {
        self.random_offset_range
    }

    /// Minimum number of shots.
    pub fn min_shots(&self) -> usize {
        self.min_shots
    }

    /// Window anchor.
    pub fn anchor(&self) -> WindowAnchor {
        self.anchor
    }

    /// Windows per boundary actually generated: 1 when there is no jitter,
    /// since every variation would be identical.
    pub fn effective_variations(&self) -> usize {
        if self.random_offset_range == 0 {
            1
        } else {
            self.variations_per_boundary
        }
    }

    /// Number of frames from the first position to the last, inclusive.
    pub fn span(&self) -> u64 {
        (self.sequence_length as u64).saturating_sub(1) * self.stride + 1
    }

    /// Check that the configuration can produce a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ShotFramesError::InvalidConfiguration`] if the sequence
    /// length or stride is zero, or the offset range does not fit in `i64`.
    pub fn validate(&self) -> Result<(), ShotFramesError> {
        if self.sequence_length == 0 {
            return Err(ShotFramesError::InvalidConfiguration(
                "sequence length must be greater than zero".to_string(),
            ));
        }
        if self.stride == 0 {
            return Err(ShotFramesError::InvalidConfiguration(
                "stride must be greater than zero".to_string(),
            ));
        }
        if i64::try_from(self.random_offset_range).is_err() {
            return Err(ShotFramesError::InvalidConfiguration(format!(
                "random offset range {} is too large",
                self.random_offset_range
            )));
        }
        Ok(())
    }
}
