//! FrameBuffer and FrameData accessor tests.

use image::{DynamicImage, GrayImage, RgbImage};
use shotframes::{FrameBuffer, FrameSource, SessionOptions, SyntheticSource, VideoSession};

#[test]
fn synthetic_frame_layout() {
    let mut source = SyntheticSource::with_dimensions(400, 25.0, 8, 6);
    let frame = source.decode_at(300).unwrap();
    assert_eq!((frame.width(), frame.height()), (8, 6));
    assert_eq!(frame.channels(), 3);
    assert_eq!(frame.as_bytes().len(), 8 * 6 * 3);
    assert_eq!(&frame.as_bytes()[..3], &[44, 1, 0]);
    assert_eq!(SyntheticSource::position_of(&frame), 300);
}

#[test]
fn normalized_samples_are_in_unit_range() {
    let image = RgbImage::from_pixel(2, 2, image::Rgb([0, 255, 51]));
    let frame = FrameBuffer::new(DynamicImage::ImageRgb8(image));
    let samples = frame.to_normalized_f32();

    assert_eq!(samples.len(), 12);
    assert_eq!(samples[0], 0.0);
    assert_eq!(samples[1], 1.0);
    assert!((samples[2] - 0.2).abs() < 1e-6);
}

#[test]
fn grayscale_buffer_has_one_channel() {
    let frame = FrameBuffer::new(DynamicImage::ImageLuma8(GrayImage::new(3, 3)));
    assert_eq!(frame.channels(), 1);
    assert_eq!(frame.to_normalized_f32().len(), 9);
}

#[test]
fn clones_share_pixels() {
    let frame = FrameBuffer::new(DynamicImage::ImageRgb8(RgbImage::new(1, 1)));
    let copy = frame.clone();
    assert!(frame.ptr_eq(&copy));

    let other = FrameBuffer::new(DynamicImage::ImageRgb8(RgbImage::new(1, 1)));
    assert!(!frame.ptr_eq(&other));
}

#[test]
fn frame_data_into_frame() {
    let mut session = VideoSession::new(SyntheticSource::new(20, 4.0), &SessionOptions::new());
    let data = session.fetch(6).unwrap();
    assert_eq!(data.position(), 6);
    assert!((data.timestamp() - 1.5).abs() < 1e-9);
    assert!((session.info().timestamp_of(6) - 1.5).abs() < 1e-9);

    let frame = data.into_frame();
    assert_eq!(SyntheticSource::position_of(&frame), 6);
}
