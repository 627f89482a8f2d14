//! The decoded-frame source contract.
//!
//! A [`FrameSource`] is an opened video that can report its frame count and
//! frame rate and decode a frame at an absolute position. The crate ships
//! two implementations: [`FfmpegSource`](crate::FfmpegSource) for real
//! files, and [`SyntheticSource`] which generates deterministic frames in
//! memory and records every decode call.
//!
//! A source is released when it is dropped; [`VideoSession`](crate::VideoSession)
//! owns exactly one source for its whole lifetime.

use std::collections::HashSet;

use image::{DynamicImage, RgbImage};

use crate::error::ShotFramesError;
use crate::frame::FrameBuffer;

/// Attributes of an opened video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    /// Path or other identifier the video was opened from.
    pub identifier: String,
    /// Number of decodable frames. Valid positions are `0..total_frames`.
    pub total_frames: u64,
    /// Frames per second.
    pub frames_per_second: f64,
    /// Frame width in pixels, before any output scaling.
    pub width: u32,
    /// Frame height in pixels, before any output scaling.
    pub height: u32,
}

impl VideoInfo {
    /// Duration in seconds, or `0.0` if the frame rate is unknown.
    pub fn duration_seconds(&self) -> f64 {
        if self.frames_per_second > 0.0 {
            self.total_frames as f64 / self.frames_per_second
        } else {
            0.0
        }
    }

    /// Presentation time of `position` in seconds.
    pub fn timestamp_of(&self, position: u64) -> f64 {
        crate::utilities::position_to_seconds(position, self.frames_per_second)
    }
}

/// An opened video that can decode frames by absolute position.
///
/// Implementations may assume callers request positions mostly in
/// ascending order and optimise for forward decoding; they must still
/// return the correct frame for any in-range position.
pub trait FrameSource {
    /// Attributes of the opened video.
    fn info(&self) -> &VideoInfo;

    /// Decode the frame at `position` (0-indexed).
    ///
    /// Callers validate `position < info().total_frames` beforehand.
    ///
    /// # Errors
    ///
    /// Returns a decode-class [`ShotFramesError`] if the frame cannot be
    /// produced.
    fn decode_at(&mut self, position: u64) -> Result<FrameBuffer, ShotFramesError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn info(&self) -> &VideoInfo {
        (**self).info()
    }

    fn decode_at(&mut self, position: u64) -> Result<FrameBuffer, ShotFramesError> {
        (**self).decode_at(position)
    }
}

/// Opens a [`FrameSource`] for a video identifier.
///
/// Used by [`ShotSequenceDataset`](crate::ShotSequenceDataset) to open one
/// independent source per loaded sequence. Closures
/// `Fn(&str) -> Result<S, ShotFramesError>` implement this trait and report
/// every identifier as available.
pub trait SourceOpener {
    /// The source type produced.
    type Source: FrameSource;

    /// Open the video named `identifier`.
    ///
    /// # Errors
    ///
    /// Returns a decode-class [`ShotFramesError`] if the video cannot be
    /// opened.
    fn open(&self, identifier: &str) -> Result<Self::Source, ShotFramesError>;

    /// Whether a video exists for `identifier`, checked without opening it.
    ///
    /// The dataset drops annotations whose video is missing.
    fn contains(&self, _identifier: &str) -> bool {
        true
    }
}

impl<F, S> SourceOpener for F
where
    F: Fn(&str) -> Result<S, ShotFramesError>,
    S: FrameSource,
{
    type Source = S;

    fn open(&self, identifier: &str) -> Result<S, ShotFramesError> {
        self(identifier)
    }
}

/// A deterministic in-memory video.
///
/// Frame `p` is a solid RGB image whose red channel is `p % 256` and green
/// channel is `(p / 256) % 256`, so the position can be read back from any
/// pixel with [`SyntheticSource::position_of`]. Every call to
/// [`decode_at`](FrameSource::decode_at) is recorded, and decoder seeks are
/// counted the way a real decoder would incur them: any request that is not
/// the frame directly after the previous one.
///
/// # Example
///
/// ```
/// use shotframes::{FrameSource, SyntheticSource};
///
/// let mut source = SyntheticSource::new(100, 25.0);
/// let frame = source.decode_at(42)?;
/// assert_eq!(SyntheticSource::position_of(&frame), 42);
/// assert_eq!(source.decode_log(), &[42]);
/// # Ok::<(), shotframes::ShotFramesError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    info: VideoInfo,
    failing: HashSet<u64>,
    decode_log: Vec<u64>,
    seeks: u64,
    cursor: Option<u64>,
}

impl SyntheticSource {
    /// A 4×4 video of `total_frames` frames at `frames_per_second`.
    pub fn new(total_frames: u64, frames_per_second: f64) -> Self {
        Self::with_dimensions(total_frames, frames_per_second, 4, 4)
    }

    /// A video with explicit frame dimensions.
    pub fn with_dimensions(
        total_frames: u64,
        frames_per_second: f64,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            info: VideoInfo {
                identifier: "synthetic".to_string(),
                total_frames,
                frames_per_second,
                width,
                height,
            },
            failing: HashSet::new(),
            decode_log: Vec::new(),
            seeks: 0,
            cursor: None,
        }
    }

    /// Set the identifier reported by [`info`](FrameSource::info).
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.info.identifier = identifier.into();
        self
    }

    /// Make decoding `position` fail with [`ShotFramesError::DecodeError`].
    #[must_use]
    pub fn failing_at(mut self, position: u64) -> Self {
        self.failing.insert(position);
        self
    }

    /// Every position decoded so far, in call order.
    pub fn decode_log(&self) -> &[u64] {
        &self.decode_log
    }

    /// Number of non-sequential decode requests so far.
    pub fn seek_count(&self) -> u64 {
        self.seeks
    }

    /// Recover the position a synthetic frame was generated for.
    pub fn position_of(frame: &FrameBuffer) -> u64 {
        match frame.as_bytes() {
            [red, green, ..] => u64::from(*red) + 256 * u64::from(*green),
            _ => 0,
        }
    }

    fn render(&self, position: u64) -> FrameBuffer {
        let red = (position % 256) as u8;
        let green = ((position / 256) % 256) as u8;
        let image = RgbImage::from_pixel(
            self.info.width,
            self.info.height,
            image::Rgb([red, green, 0]),
        );
        FrameBuffer::new(DynamicImage::ImageRgb8(image))
    }
}

impl FrameSource for SyntheticSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn decode_at(&mut self, position: u64) -> Result<FrameBuffer, ShotFramesError> {
        if position >= self.info.total_frames {
            return Err(ShotFramesError::DecodeError(format!(
                "Could not locate frame {position} in the video stream"
            )));
        }
        if self.cursor.map_or(position != 0, |cursor| position != cursor + 1) {
            self.seeks += 1;
        }
        self.cursor = Some(position);
        self.decode_log.push(position);

        if self.failing.contains(&position) {
            return Err(ShotFramesError::DecodeError(format!(
                "Failed to read frame at position {position}"
            )));
        }
        Ok(self.render(position))
    }
}
