//! Internal utility functions.
//!
//! Position/timestamp conversion and pixel-plane copying shared by the
//! session and the FFmpeg source.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Presentation time of a frame position in seconds.
///
/// Returns `0.0` when the frame rate is unknown.
pub(crate) fn position_to_seconds(position: u64, frames_per_second: f64) -> f64 {
    if frames_per_second > 0.0 {
        position as f64 / frames_per_second
    } else {
        0.0
    }
}

/// Convert a frame position to a container seek timestamp in
/// `AV_TIME_BASE` units (microseconds), as expected by `Input::seek`.
pub(crate) fn position_to_seek_timestamp(position: u64, frames_per_second: f64) -> i64 {
    (position_to_seconds(position, frames_per_second) * 1_000_000.0) as i64
}

/// Convert a PTS in the stream's time base to a frame position.
///
/// Rounds to the nearest frame so timestamps that are a hair under the exact
/// frame boundary do not map to the previous frame.
pub(crate) fn pts_to_position(pts: i64, time_base: Rational, frames_per_second: f64) -> u64 {
    let denominator = time_base.denominator().max(1) as f64;
    let seconds = pts as f64 * time_base.numerator() as f64 / denominator;
    (seconds * frames_per_second).round().max(0.0) as u64
}

/// Copy plane 0 of a packed-format frame into a tightly packed buffer,
/// dropping any per-row padding.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}
