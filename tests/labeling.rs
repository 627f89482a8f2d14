//! Shot label assignment tests.

use shotframes::{Sequence, ShotBoundary, ShotFramesError, ShotLabel, VideoAnnotation, label};

fn indices(labels: &[ShotLabel]) -> Vec<u8> {
    labels.iter().map(|label| label.index()).collect()
}

#[test]
fn instant_cut_has_no_transition_frames() {
    let boundary = ShotBoundary::new(131, 132).unwrap();
    let labels = label(&[129, 130, 131, 132, 133], &boundary);
    assert_eq!(indices(&labels), vec![0, 0, 0, 2, 2]);
    assert!(boundary.is_instant());
}

#[test]
fn gradual_transition_frames_are_labelled() {
    let boundary = ShotBoundary::new(131, 134).unwrap();
    let labels = label(&[129, 130, 131, 132, 133, 134, 135], &boundary);
    assert_eq!(indices(&labels), vec![0, 0, 0, 1, 1, 2, 2]);
    assert_eq!(boundary.transition_len(), 2);
}

#[test]
fn boundary_edges_belong_to_their_shots() {
    let boundary = ShotBoundary::new(10, 20).unwrap();
    assert_eq!(ShotLabel::for_position(10, &boundary), ShotLabel::PreviousShot);
    assert_eq!(ShotLabel::for_position(11, &boundary), ShotLabel::Transition);
    assert_eq!(ShotLabel::for_position(19, &boundary), ShotLabel::Transition);
    assert_eq!(ShotLabel::for_position(20, &boundary), ShotLabel::NextShot);
}

#[test]
fn labels_follow_input_order() {
    let boundary = ShotBoundary::new(5, 6).unwrap();
    let labels = label(&[9, 0, 5, 6], &boundary);
    assert_eq!(indices(&labels), vec![2, 0, 0, 2]);
}

#[test]
fn window_entirely_on_one_side() {
    let boundary = ShotBoundary::new(500, 501).unwrap();
    assert!(label(&[1, 2, 3], &boundary).iter().all(|l| *l == ShotLabel::PreviousShot));
    assert!(label(&[900, 901], &boundary).iter().all(|l| *l == ShotLabel::NextShot));
}

#[test]
fn empty_positions_give_empty_labels() {
    let boundary = ShotBoundary::new(1, 2).unwrap();
    assert!(label(&[], &boundary).is_empty());
}

#[test]
fn label_display_names() {
    assert_eq!(ShotLabel::PreviousShot.to_string(), "previous");
    assert_eq!(ShotLabel::Transition.to_string(), "transition");
    assert_eq!(ShotLabel::NextShot.to_string(), "next");
}

#[test]
fn sequence_counts_labels() {
    let boundary = ShotBoundary::new(131, 134).unwrap();
    let sequence = Sequence::new((128..=137).collect(), boundary);

    assert_eq!(sequence.len(), 10);
    assert!(!sequence.is_empty());
    assert_eq!(sequence.boundary(), &boundary);
    assert_eq!(sequence.label_indices(), vec![0, 0, 0, 0, 1, 1, 2, 2, 2, 2]);
    assert_eq!(sequence.label_counts(), [4, 2, 4]);
}

// ── Boundaries and annotations ───────────────────────────────────

#[test]
fn boundary_requires_from_before_to() {
    assert!(matches!(
        ShotBoundary::new(10, 10),
        Err(ShotFramesError::InvalidBoundary { from: 10, to: 10 })
    ));
    assert!(ShotBoundary::new(11, 10).is_err());
}

#[test]
fn boundary_midpoint_rounds_down() {
    assert_eq!(ShotBoundary::new(100, 110).unwrap().midpoint(), 105);
    assert_eq!(ShotBoundary::new(100, 101).unwrap().midpoint(), 100);
}

#[test]
fn annotation_shot_count() {
    let video =
        VideoAnnotation::from_pairs("clip.mp4", 900, 25.0, &[(100, 101), (300, 305)]).unwrap();
    assert_eq!(video.shot_count(), 3);
    assert_eq!(video.boundaries[1].to(), 305);
}

#[test]
fn annotation_rejects_bad_pair() {
    let result = VideoAnnotation::from_pairs("clip.mp4", 900, 25.0, &[(100, 101), (305, 300)]);
    assert!(matches!(
        result,
        Err(ShotFramesError::InvalidBoundary { from: 305, to: 300 })
    ));
}
