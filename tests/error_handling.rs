//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

use std::path::Path;

use shotframes::{
    PositionSpec, SamplerConfig, SequenceSampler, SessionOptions, ShotFramesError,
    SyntheticSource, VideoAnnotation, VideoSession, expand_range,
};

#[test]
fn open_nonexistent_file() {
    let result = VideoSession::open("this_file_does_not_exist.mp4", &SessionOptions::new());
    assert!(result.is_err());

    let error = result.err().unwrap();
    assert!(error.is_decode_failure());
    let error_message = error.to_string();
    assert!(
        error_message.contains("Failed to open video file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    // Create a temporary file with garbage content.
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a video file")
        .expect("Failed to write invalid file");

    let result = VideoSession::open(&invalid_file_path, &SessionOptions::new());
    assert!(result.is_err(), "Expected error for invalid video file");
    assert!(result.err().unwrap().is_decode_failure());
}

#[test]
fn position_out_of_range_message() {
    let mut session = VideoSession::new(SyntheticSource::new(50, 25.0), &SessionOptions::new());
    let error_message = session.fetch(50).unwrap_err().to_string();
    assert!(
        error_message.contains("out of range"),
        "Error message should mention out of range: {error_message}",
    );
    assert!(error_message.contains("50 frames"));
}

#[test]
fn frame_out_of_range_in_real_file() {
    let path = "tests/fixtures/sample_video.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let mut session =
        VideoSession::open(path, &SessionOptions::new()).expect("Failed to open test video");
    let result = session.fetch(999_999);
    assert!(matches!(
        result,
        Err(ShotFramesError::PositionOutOfRange { position: 999_999, .. })
    ));
}

#[test]
fn invalid_range_message() {
    let error_message = expand_range(5, 1, 1).unwrap_err().to_string();
    assert!(
        error_message.contains("Invalid range"),
        "Error message should mention the range: {error_message}",
    );
}

#[test]
fn invalid_position_message() {
    let error_message = PositionSpec::from(-4).resolve().unwrap_err().to_string();
    assert!(error_message.contains("-4"), "{error_message}");
    assert!(error_message.contains("non-negative"), "{error_message}");
}

#[test]
fn insufficient_shots_message() {
    let video = VideoAnnotation::from_pairs("lonely.mp4", 100, 25.0, &[]).unwrap();
    let mut sampler = SequenceSampler::seeded(SamplerConfig::new(), 0).unwrap();
    let error_message = sampler.sample(&video).unwrap_err().to_string();
    assert!(error_message.contains("lonely.mp4"), "{error_message}");
    assert!(error_message.contains("at least 2"), "{error_message}");
}

#[test]
fn decode_error_is_a_decode_failure() {
    let source = SyntheticSource::new(10, 25.0).failing_at(3);
    let mut session = VideoSession::new(source, &SessionOptions::new());
    let error = session.fetch(3).unwrap_err();
    assert!(error.is_decode_failure());
    assert!(error.to_string().contains("Failed to decode video frame"));
}

#[test]
fn validation_errors_are_not_decode_failures() {
    let error = expand_range(0, 10, 0).unwrap_err();
    assert!(!error.is_decode_failure());

    let error = SequenceSampler::seeded(SamplerConfig::new().with_sequence_length(0), 0)
        .err()
        .unwrap();
    assert!(matches!(error, ShotFramesError::InvalidConfiguration(_)));
    assert!(!error.is_decode_failure());
}

#[test]
fn io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: ShotFramesError = io_error.into();
    assert!(error.to_string().contains("I/O error"));
}
