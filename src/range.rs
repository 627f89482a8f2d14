//! Range and window expansion.
//!
//! [`expand_range`] turns `(start, end, step)` into explicit positions, and
//! [`expand_window`] produces the neighbourhood of a centre frame. Both
//! return plain position lists that can be passed to
//! [`VideoSession::fetch_many`](crate::VideoSession::fetch_many) or wrapped
//! in a [`PositionSpec`](crate::PositionSpec).

use crate::error::ShotFramesError;

/// Expand `start, start + step, ...` up to and including `end`.
///
/// `start` is always included. `end` is included only when stepping lands on
/// it exactly: `expand_range(0, 10, 5)` is `[0, 5, 10]` while
/// `expand_range(0, 9, 5)` is `[0, 5]`. `start == end` yields `[start]`.
///
/// # Errors
///
/// Returns [`ShotFramesError::InvalidRange`] if `step <= 0`, `start > end`,
/// or `start` is negative.
///
/// # Example
///
/// ```
/// use shotframes::expand_range;
///
/// assert_eq!(expand_range(10, 16, 2)?, vec![10, 12, 14, 16]);
/// # Ok::<(), shotframes::ShotFramesError>(())
/// ```
pub fn expand_range(start: i64, end: i64, step: i64) -> Result<Vec<u64>, ShotFramesError> {
    if step <= 0 || start > end || start < 0 {
        return Err(ShotFramesError::InvalidRange { start, end, step });
    }

    let count = ((end - start) / step + 1) as usize;
    Ok((0..count)
        .map(|i| (start + i as i64 * step) as u64)
        .collect())
}

/// Expand several `(start, end)` ranges with a shared step, concatenated in
/// order. Overlapping ranges produce repeated positions.
///
/// # Errors
///
/// Fails on the first malformed range, see [`expand_range`].
pub fn expand_ranges(ranges: &[(i64, i64)], step: i64) -> Result<Vec<u64>, ShotFramesError> {
    let mut positions = Vec::new();
    for &(start, end) in ranges {
        positions.extend(expand_range(start, end, step)?);
    }
    Ok(positions)
}

/// The consecutive positions `center - window_size ..= center + window_size`
/// that lie inside `[0, total_frames)`.
///
/// Positions past either edge of the video are dropped rather than treated
/// as errors, so a window near the start or end is shorter than
/// `2 * window_size + 1`. For a 200-frame video, a window of 5 around frame
/// 100 is `[95, ..., 105]`, a window of 5 around frame 2 is `[0, ..., 7]`,
/// and a window of 5 around frame 202 is `[197, 198, 199]`. A window with no
/// frame inside the video is empty.
///
/// # Example
///
/// ```
/// use shotframes::expand_window;
///
/// assert_eq!(expand_window(202, 5, 200), vec![197, 198, 199]);
/// assert!(expand_window(300, 5, 200).is_empty());
/// ```
pub fn expand_window(center: u64, window_size: u64, total_frames: u64) -> Vec<u64> {
    let Some(last_frame) = total_frames.checked_sub(1) else {
        return Vec::new();
    };

    let first = center.saturating_sub(window_size);
    let last = center.saturating_add(window_size).min(last_frame);
    if first > last {
        return Vec::new();
    }
    (first..=last).collect()
}

/// Windows around several centres, concatenated in order.
pub fn expand_windows(centers: &[u64], window_size: u64, total_frames: u64) -> Vec<u64> {
    centers
        .iter()
        .flat_map(|&center| expand_window(center, window_size, total_frames))
        .collect()
}
