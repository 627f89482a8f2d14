//! Shot sequence dataset tests, using synthetic sources as the opener.

use shotframes::{
    FfmpegOpener, SamplerConfig, SessionOptions, ShotFramesError, ShotSequenceDataset,
    SourceOpener, SyntheticSource, VideoAnnotation,
};

fn open_synthetic(identifier: &str) -> Result<SyntheticSource, ShotFramesError> {
    let total_frames = match identifier {
        "a.mp4" => 200,
        "b.mp4" => 300,
        "c.mp4" => 10,
        "short.mp4" => 100,
        other => {
            return Err(ShotFramesError::FileOpen {
                path: other.into(),
                reason: "Video file not found".to_string(),
            });
        }
    };
    Ok(SyntheticSource::new(total_frames, 25.0).with_identifier(identifier))
}

fn annotations() -> Vec<VideoAnnotation> {
    vec![
        VideoAnnotation::from_pairs("a.mp4", 200, 25.0, &[(50, 51), (120, 125)]).unwrap(),
        VideoAnnotation::from_pairs("b.mp4", 300, 25.0, &[]).unwrap(),
        VideoAnnotation::from_pairs("c.mp4", 10, 25.0, &[(4, 5)]).unwrap(),
    ]
}

type Opener = fn(&str) -> Result<SyntheticSource, ShotFramesError>;

fn dataset(config: SamplerConfig, seed: u64) -> ShotSequenceDataset<Opener> {
    ShotSequenceDataset::new(
        annotations(),
        open_synthetic as Opener,
        config,
        SessionOptions::new(),
        seed,
    )
    .unwrap()
}

#[test]
fn videos_without_boundaries_are_filtered() {
    let dataset = dataset(SamplerConfig::new(), 1);
    let identifiers: Vec<&str> = dataset
        .videos()
        .iter()
        .map(|video| video.identifier.as_str())
        .collect();
    assert_eq!(identifiers, vec!["a.mp4", "c.mp4"]);
}

#[test]
fn three_variations_per_boundary_and_unfit_windows_skipped() {
    let dataset = dataset(SamplerConfig::new(), 1);
    // a.mp4: 2 boundaries x 3 variations. c.mp4 is too short for 16 frames.
    assert_eq!(dataset.len(), 6);
    assert!(dataset.plans().iter().all(|plan| plan.video_index == 0));

    let boundaries: Vec<usize> = dataset.plans().iter().map(|plan| plan.boundary_index).collect();
    assert_eq!(boundaries, vec![0, 0, 0, 1, 1, 1]);
}

#[test]
fn no_jitter_means_one_window_per_boundary() {
    let dataset = dataset(SamplerConfig::new().with_random_offset_range(0), 1);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.plan(0).unwrap().positions[0], 42);
    assert_eq!(dataset.plan(1).unwrap().positions[0], 112);
}

#[test]
fn min_shots_filter() {
    let config = SamplerConfig::new().with_min_shots(3).with_sequence_length(4);
    let dataset = dataset(config, 1);
    assert_eq!(dataset.videos().len(), 1);
    assert_eq!(dataset.videos()[0].identifier, "a.mp4");
}

#[test]
fn short_windows_fit_short_videos() {
    let config = SamplerConfig::new().with_sequence_length(8);
    let dataset = dataset(config, 1);
    assert_eq!(dataset.len(), 9);
    assert!(dataset.plans().iter().any(|plan| plan.video_index == 1));
}

#[test]
fn same_seed_same_index() {
    let first = dataset(SamplerConfig::new(), 11);
    let second = dataset(SamplerConfig::new(), 11);
    assert_eq!(first.plans(), second.plans());
}

#[test]
fn regenerate_matches_fresh_index() {
    let mut regenerated = dataset(SamplerConfig::new(), 1);
    regenerated.regenerate(2).unwrap();
    let fresh = dataset(SamplerConfig::new(), 2);
    assert_eq!(regenerated.plans(), fresh.plans());
}

#[test]
fn sequence_without_decoding() {
    let dataset = dataset(SamplerConfig::new().with_random_offset_range(0), 1);
    let sequence = dataset.sequence(0).unwrap();
    assert_eq!(sequence.positions(), &(42..58).collect::<Vec<u64>>()[..]);
    // 42..=50 previous, 51..=57 next.
    assert_eq!(sequence.label_counts(), [9, 0, 7]);
}

#[test]
fn sequence_info_describes_entry() {
    let dataset = dataset(SamplerConfig::new().with_random_offset_range(0), 1);
    let info = dataset.sequence_info(1).unwrap();
    assert_eq!(info.identifier, "a.mp4");
    assert_eq!(info.total_frames, 200);
    assert_eq!(info.shot_count, 3);
    assert_eq!(info.sequence_start, 112);
    assert_eq!(info.sequence_end, 127);
    assert_eq!(info.boundary.from(), 120);
}

#[test]
fn load_decodes_and_labels() {
    let dataset = dataset(SamplerConfig::new(), 3);
    for index in 0..dataset.len() {
        let sample = dataset.load(index).unwrap();
        let plan = dataset.plan(index).unwrap();

        assert_eq!(sample.frames.len(), 16);
        assert_eq!(sample.sequence.positions(), plan.positions.as_slice());
        assert_eq!(sample.sequence.labels().len(), 16);
        for (frame, &position) in sample.frames.iter().zip(&plan.positions) {
            assert_eq!(frame.position(), position);
            assert_eq!(SyntheticSource::position_of(frame.frame()), position);
        }
    }
}

#[test]
fn iter_loads_every_entry() {
    let dataset = dataset(SamplerConfig::new(), 3);
    let loaded: Vec<_> = dataset.iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(loaded.len(), dataset.len());
}

#[test]
fn bad_index() {
    let dataset = dataset(SamplerConfig::new(), 1);
    assert!(matches!(
        dataset.load(6),
        Err(ShotFramesError::IndexOutOfRange { index: 6, len: 6 })
    ));
    assert!(dataset.sequence_info(100).is_err());
}

#[test]
fn open_failure_surfaces_to_caller() {
    let videos =
        vec![VideoAnnotation::from_pairs("missing.mp4", 200, 25.0, &[(100, 101)]).unwrap()];
    let dataset = ShotSequenceDataset::new(
        videos,
        open_synthetic as Opener,
        SamplerConfig::new(),
        SessionOptions::new(),
        1,
    )
    .unwrap();

    let error = dataset.load(0).unwrap_err();
    assert!(error.is_decode_failure());
    assert!(error.to_string().contains("missing.mp4"));
}

/// Serves synthetic videos, but only for the identifiers it was given.
struct Library {
    available: Vec<&'static str>,
}

impl SourceOpener for Library {
    type Source = SyntheticSource;

    fn open(&self, identifier: &str) -> Result<SyntheticSource, ShotFramesError> {
        open_synthetic(identifier)
    }

    fn contains(&self, identifier: &str) -> bool {
        self.available.contains(&identifier)
    }
}

#[test]
fn videos_without_source_are_not_indexed() {
    let library = Library {
        available: vec!["a.mp4", "b.mp4"],
    };
    let config = SamplerConfig::new().with_sequence_length(4);
    let dataset =
        ShotSequenceDataset::new(annotations(), library, config, SessionOptions::new(), 1)
            .unwrap();

    let identifiers: Vec<&str> = dataset
        .videos()
        .iter()
        .map(|video| video.identifier.as_str())
        .collect();
    assert_eq!(identifiers, vec!["a.mp4"]);
    assert_eq!(dataset.len(), 6);
    assert!(dataset.plans().iter().all(|plan| plan.video_index == 0));
    assert!(dataset.iter().all(|sample| sample.is_ok()));
}

#[test]
fn ffmpeg_opener_skips_missing_files() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(directory.path().join("a.mp4"), b"").expect("Failed to write file");

    let opener = FfmpegOpener::new(directory.path(), SessionOptions::new());
    assert!(opener.contains("a.mp4"));
    assert!(!opener.contains("c.mp4"));

    let videos = vec![VideoAnnotation::from_pairs("c.mp4", 200, 25.0, &[(100, 101)]).unwrap()];
    let dataset =
        ShotSequenceDataset::new(videos, opener, SamplerConfig::new(), SessionOptions::new(), 1)
            .unwrap();
    assert!(dataset.is_empty());
    assert!(dataset.videos().is_empty());
}

#[test]
fn annotation_longer_than_video_fails_to_load() {
    let videos = vec![VideoAnnotation::from_pairs("short.mp4", 200, 25.0, &[(150, 151)]).unwrap()];
    let dataset = ShotSequenceDataset::new(
        videos,
        |identifier: &str| open_synthetic(identifier),
        SamplerConfig::new().with_random_offset_range(0),
        SessionOptions::new(),
        1,
    )
    .unwrap();

    assert!(matches!(
        dataset.load(0),
        Err(ShotFramesError::PositionOutOfRange {
            position: 142,
            total_frames: 100
        })
    ));
}

#[test]
fn invalid_config_is_rejected() {
    let result = ShotSequenceDataset::new(
        annotations(),
        open_synthetic as Opener,
        SamplerConfig::new().with_sequence_length(0),
        SessionOptions::new(),
        1,
    );
    assert!(matches!(result, Err(ShotFramesError::InvalidConfiguration(_))));
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_load_matches_sequential() {
    let dataset = dataset(SamplerConfig::new(), 5);
    let indices: Vec<usize> = (0..dataset.len()).rev().collect();

    let parallel = dataset.load_parallel(&indices).unwrap();
    for (sample, &index) in parallel.iter().zip(&indices) {
        let sequential = dataset.load(index).unwrap();
        assert_eq!(sample.sequence, sequential.sequence);
    }
}
