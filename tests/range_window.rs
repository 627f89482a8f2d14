//! Range and window expansion tests.

use shotframes::{
    FrameData, SessionOptions, ShotFramesError, SyntheticSource, VideoSession, expand_range,
    expand_ranges, expand_window, expand_windows,
};

// ── expand_range ─────────────────────────────────────────────────

#[test]
fn range_with_unit_step() {
    assert_eq!(expand_range(3, 7, 1).unwrap(), vec![3, 4, 5, 6, 7]);
}

#[test]
fn range_includes_end_when_step_lands_on_it() {
    assert_eq!(expand_range(0, 10, 5).unwrap(), vec![0, 5, 10]);
}

#[test]
fn range_excludes_end_when_step_overshoots() {
    assert_eq!(expand_range(0, 9, 5).unwrap(), vec![0, 5]);
    assert_eq!(expand_range(10, 15, 2).unwrap(), vec![10, 12, 14]);
}

#[test]
fn range_with_equal_bounds() {
    assert_eq!(expand_range(42, 42, 3).unwrap(), vec![42]);
}

#[test]
fn range_with_step_larger_than_span() {
    assert_eq!(expand_range(5, 8, 100).unwrap(), vec![5]);
}

#[test]
fn range_rejects_non_positive_step() {
    assert!(matches!(
        expand_range(0, 10, 0),
        Err(ShotFramesError::InvalidRange { step: 0, .. })
    ));
    assert!(expand_range(0, 10, -1).is_err());
}

#[test]
fn range_rejects_reversed_bounds() {
    assert!(matches!(
        expand_range(10, 5, 1),
        Err(ShotFramesError::InvalidRange {
            start: 10,
            end: 5,
            step: 1
        })
    ));
}

#[test]
fn range_rejects_negative_start() {
    assert!(expand_range(-3, 5, 1).is_err());
}

#[test]
fn ranges_concatenate_in_order() {
    let positions = expand_ranges(&[(20, 24), (0, 4)], 2).unwrap();
    assert_eq!(positions, vec![20, 22, 24, 0, 2, 4]);
}

#[test]
fn ranges_fail_on_first_bad_range() {
    assert!(expand_ranges(&[(0, 4), (9, 1)], 1).is_err());
}

// ── expand_window ────────────────────────────────────────────────

#[test]
fn window_in_the_middle() {
    let positions = expand_window(100, 5, 200);
    assert_eq!(positions, (95..=105).collect::<Vec<u64>>());
}

#[test]
fn window_clamped_at_start() {
    let positions = expand_window(2, 5, 200);
    assert_eq!(positions, (0..=7).collect::<Vec<u64>>());
}

#[test]
fn window_clamped_at_end() {
    let positions = expand_window(198, 5, 200);
    assert_eq!(positions, (193..=199).collect::<Vec<u64>>());
}

#[test]
fn window_of_zero_is_the_centre() {
    assert_eq!(expand_window(17, 0, 200), vec![17]);
}

#[test]
fn window_larger_than_video() {
    let positions = expand_window(3, 1000, 10);
    assert_eq!(positions, (0..10).collect::<Vec<u64>>());
}

#[test]
fn window_centre_past_end_keeps_overlap() {
    assert_eq!(expand_window(202, 5, 200), vec![197, 198, 199]);
    assert_eq!(expand_window(200, 5, 200), (195..200).collect::<Vec<u64>>());
}

#[test]
fn window_entirely_outside_video_is_empty() {
    assert!(expand_window(300, 5, 200).is_empty());
    assert!(expand_window(205, 5, 200).is_empty());
}

#[test]
fn window_over_empty_video_is_empty() {
    assert!(expand_window(0, 5, 0).is_empty());
}

#[test]
fn window_with_huge_size_does_not_overflow() {
    assert_eq!(expand_window(u64::MAX, u64::MAX, 3), vec![0, 1, 2]);
}

#[test]
fn windows_concatenate_in_order() {
    let positions = expand_windows(&[10, 0], 1, 100);
    assert_eq!(positions, vec![9, 10, 11, 0, 1]);
}

#[test]
fn windows_skip_centres_outside_video() {
    let positions = expand_windows(&[98, 150, 101], 2, 100);
    assert_eq!(positions, vec![96, 97, 98, 99, 99]);
}

// ── Session helpers ──────────────────────────────────────────────

#[test]
fn session_fetch_range() {
    let mut session = VideoSession::new(SyntheticSource::new(100, 25.0), &SessionOptions::new());
    let frames = session.fetch_range(10, 16, 2).unwrap();
    let positions: Vec<u64> = frames.iter().map(FrameData::position).collect();
    assert_eq!(positions, vec![10, 12, 14, 16]);
}

#[test]
fn session_fetch_range_past_end_decodes_nothing() {
    let mut session = VideoSession::new(SyntheticSource::new(100, 25.0), &SessionOptions::new());
    let result = session.fetch_range(90, 110, 5);
    assert!(matches!(
        result,
        Err(ShotFramesError::PositionOutOfRange { position: 100, .. })
    ));
    assert!(session.source().decode_log().is_empty());
}

#[test]
fn session_fetch_ranges_and_windows() {
    let mut session = VideoSession::new(SyntheticSource::new(100, 25.0), &SessionOptions::new());

    let frames = session.fetch_ranges(&[(0, 2), (50, 52)], 1).unwrap();
    let positions: Vec<u64> = frames.iter().map(FrameData::position).collect();
    assert_eq!(positions, vec![0, 1, 2, 50, 51, 52]);

    let frames = session.fetch_windows(&[1, 98], 2).unwrap();
    let positions: Vec<u64> = frames.iter().map(FrameData::position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3, 96, 97, 98, 99]);
}

#[test]
fn session_fetch_window_clamped() {
    let mut session = VideoSession::new(SyntheticSource::new(200, 25.0), &SessionOptions::new());
    let frames = session.fetch_window(2, 5).unwrap();
    let positions: Vec<u64> = frames.iter().map(FrameData::position).collect();
    assert_eq!(positions, (0..=7).collect::<Vec<u64>>());
}

#[test]
fn session_fetch_window_past_end() {
    let mut session = VideoSession::new(SyntheticSource::new(200, 25.0), &SessionOptions::new());
    let frames = session.fetch_window(202, 5).unwrap();
    let positions: Vec<u64> = frames.iter().map(FrameData::position).collect();
    assert_eq!(positions, vec![197, 198, 199]);

    let frames = session.fetch_window(500, 5).unwrap();
    assert!(frames.is_empty());
}
