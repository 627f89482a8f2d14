//! FFmpeg-backed frame source.
//!
//! [`FfmpegSource`] opens a video file with `ffmpeg-next`, locates the best
//! video stream, and decodes frames by absolute position. It keeps one
//! demuxer and one decoder alive for its whole lifetime and tracks where the
//! decoder currently is, so ascending requests are served by decoding
//! forward. The decoder only seeks when a request goes backwards or jumps
//! further ahead than the configured gap threshold.
//!
//! # Example
//!
//! ```no_run
//! use shotframes::{FfmpegSource, SessionOptions, VideoSession};
//!
//! let options = SessionOptions::new();
//! let source = FfmpegSource::open("input.mp4", &options)?;
//! let mut session = VideoSession::new(source, &options);
//! let frames = session.fetch_many(&[10, 11, 12])?;
//! # Ok::<(), shotframes::ShotFramesError>(())
//! ```

use std::path::{Path, PathBuf};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::context::Input,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::config::{FrameOutputConfig, PixelFormat, SessionOptions};
use crate::error::ShotFramesError;
use crate::frame::FrameBuffer;
use crate::source::{FrameSource, SourceOpener, VideoInfo};

/// A video file opened for decoding.
///
/// Dropping the source closes the demuxer and frees the decoder.
pub struct FfmpegSource {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    time_base: Rational,
    info: VideoInfo,
    output: FrameOutputConfig,
    target_width: u32,
    target_height: u32,
    seek_gap_threshold: u64,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    /// Position of the last frame the decoder produced, if any since the
    /// last seek.
    cursor: Option<u64>,
    /// The demuxer has not moved since the file was opened.
    at_start: bool,
    eof_sent: bool,
    seeks: u64,
}

impl FfmpegSource {
    /// Open a video file.
    ///
    /// Uses the frame output and seek settings of `options`; the cache
    /// policy is applied by the owning session.
    ///
    /// # Errors
    ///
    /// - [`ShotFramesError::FileOpen`] if the file does not exist or FFmpeg
    ///   cannot open it.
    /// - [`ShotFramesError::NoVideoStream`] if it has no video stream.
    /// - [`ShotFramesError::FfmpegError`] if the decoder cannot be created.
    pub fn open<P: AsRef<Path>>(path: P, options: &SessionOptions) -> Result<Self, ShotFramesError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ShotFramesError::FileOpen {
                path: path.to_path_buf(),
                reason: "Video file not found".to_string(),
            });
        }

        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init().map_err(|error| ShotFramesError::FileOpen {
            path: path.to_path_buf(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| ShotFramesError::FileOpen {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        let container_duration = input.duration();
        let (stream_index, time_base, frames_per_second, reported_frames, decoder) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or(ShotFramesError::NoVideoStream)?;

            let frames_per_second = rational_to_f64(stream.avg_frame_rate())
                .or_else(|| rational_to_f64(stream.rate()))
                .unwrap_or(0.0);

            let decoder_context = CodecContext::from_parameters(stream.parameters())?;
            let decoder = decoder_context.decoder().video()?;

            (
                stream.index(),
                stream.time_base(),
                frames_per_second,
                stream.frames(),
                decoder,
            )
        };

        if frames_per_second <= 0.0 {
            return Err(ShotFramesError::FileOpen {
                path: path.to_path_buf(),
                reason: "Video stream has no usable frame rate".to_string(),
            });
        }

        let total_frames = if reported_frames > 0 {
            reported_frames as u64
        } else {
            let seconds = container_duration.max(0) as f64 / 1_000_000.0;
            let estimate = (seconds * frames_per_second) as u64;
            log::warn!(
                "Stream does not report a frame count; estimated {estimate} frames from duration"
            );
            estimate
        };

        let width = decoder.width();
        let height = decoder.height();
        let output = options.frame_output().clone();
        let (target_width, target_height) = output.resolve_dimensions(width, height);

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            output.pixel_format.to_ffmpeg_pixel(),
            target_width,
            target_height,
            ScalingFlags::BILINEAR,
        )?;

        let info = VideoInfo {
            identifier: path.display().to_string(),
            total_frames,
            frames_per_second,
            width,
            height,
        };

        log::debug!(
            "Opened {}: {} frames at {:.3} fps, {}x{}",
            info.identifier,
            info.total_frames,
            info.frames_per_second,
            width,
            height,
        );

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            info,
            output,
            target_width,
            target_height,
            seek_gap_threshold: options.seek_gap_threshold(),
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            cursor: None,
            at_start: true,
            eof_sent: false,
            seeks: 0,
        })
    }

    /// Dimensions of the frames this source produces, after scaling.
    pub fn output_dimensions(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Number of decoder seeks performed so far.
    pub fn seek_count(&self) -> u64 {
        self.seeks
    }

    fn needs_seek(&self, position: u64) -> bool {
        match self.cursor {
            Some(cursor) => position <= cursor || position - cursor > self.seek_gap_threshold,
            None => !(self.at_start && position <= self.seek_gap_threshold),
        }
    }

    fn seek_to(&mut self, position: u64) -> Result<(), ShotFramesError> {
        let timestamp =
            crate::utilities::position_to_seek_timestamp(position, self.info.frames_per_second);
        log::trace!("Seeking to frame {position} (ts {timestamp})");
        self.input.seek(timestamp, ..=timestamp)?;
        self.decoder.flush();
        self.cursor = None;
        self.at_start = false;
        self.eof_sent = false;
        self.seeks += 1;
        Ok(())
    }

    /// Scale and convert the current `decoded_frame`.
    fn convert_current_frame(&mut self) -> Result<FrameBuffer, ShotFramesError> {
        self.scaler.run(&self.decoded_frame, &mut self.scaled_frame)?;

        let width = self.target_width;
        let height = self.target_height;
        let pixel_format = self.output.pixel_format;
        let buffer = crate::utilities::frame_to_buffer(
            &self.scaled_frame,
            width,
            height,
            pixel_format.bytes_per_pixel(),
        );

        let image = match pixel_format {
            PixelFormat::Rgb8 => {
                RgbImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgb8)
            }
            PixelFormat::Rgba8 => {
                RgbaImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgba8)
            }
            PixelFormat::Gray8 => {
                GrayImage::from_raw(width, height, buffer).map(DynamicImage::ImageLuma8)
            }
        }
        .ok_or_else(|| {
            ShotFramesError::DecodeError(
                "Failed to construct image from decoded frame data".to_string(),
            )
        })?;

        Ok(FrameBuffer::new(image))
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn decode_at(&mut self, position: u64) -> Result<FrameBuffer, ShotFramesError> {
        if self.needs_seek(position) {
            self.seek_to(position)?;
        }

        loop {
            // Drain frames the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let pts = self
                    .decoded_frame
                    .timestamp()
                    .or_else(|| self.decoded_frame.pts())
                    .unwrap_or(0);
                let current = crate::utilities::pts_to_position(
                    pts,
                    self.time_base,
                    self.info.frames_per_second,
                );
                self.cursor = Some(current);

                // A seek can land past a frame the stream does not carry an
                // exact timestamp for; the next frame is the closest match.
                if current >= position {
                    log::trace!("Decoded frame {current} for position {position}");
                    return self.convert_current_frame();
                }
                continue;
            }

            if self.eof_sent {
                return Err(ShotFramesError::DecodeError(format!(
                    "Could not locate frame {position} in the video stream"
                )));
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.stream_index {
                        self.decoder.send_packet(&packet)?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    return Err(ShotFramesError::DecodeError(format!(
                        "Failed to read packet while seeking frame {position}: {error}"
                    )));
                }
            }
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        log::debug!("Closing video file: {}", self.info.identifier);
    }
}

/// Opens [`FfmpegSource`]s for identifiers relative to a videos directory.
#[derive(Debug, Clone)]
pub struct FfmpegOpener {
    directory: PathBuf,
    options: SessionOptions,
}

impl FfmpegOpener {
    /// Resolve identifiers against `directory`.
    pub fn new<P: Into<PathBuf>>(directory: P, options: SessionOptions) -> Self {
        Self {
            directory: directory.into(),
            options,
        }
    }

    /// Full path for an identifier.
    pub fn path_for(&self, identifier: &str) -> PathBuf {
        self.directory.join(identifier)
    }
}

impl SourceOpener for FfmpegOpener {
    type Source = FfmpegSource;

    fn open(&self, identifier: &str) -> Result<FfmpegSource, ShotFramesError> {
        FfmpegSource::open(self.path_for(identifier), &self.options)
    }

    fn contains(&self, identifier: &str) -> bool {
        self.path_for(identifier).is_file()
    }
}

fn rational_to_f64(rate: Rational) -> Option<f64> {
    if rate.denominator() != 0 && rate.numerator() > 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    }
}
