//! Decoded frame values.
//!
//! [`FrameBuffer`] is an immutable, cheaply cloneable handle to decoded pixel
//! data. [`FrameData`] pairs a buffer with the absolute position it was
//! decoded from and its presentation time.

use std::sync::Arc;

use image::DynamicImage;

/// An immutable decoded frame.
///
/// Cloning a `FrameBuffer` shares the underlying pixels; nothing can mutate
/// them after construction. Channel order and value range are whatever the
/// producing source was configured for (see
/// [`FrameOutputConfig`](crate::FrameOutputConfig)).
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    image: Arc<DynamicImage>,
}

impl FrameBuffer {
    /// Wrap a decoded image.
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Number of colour channels (1 for grayscale, 3 for RGB, 4 for RGBA).
    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    /// Borrow the frame as an [`image::DynamicImage`].
    pub fn as_image(&self) -> &DynamicImage {
        &self.image
    }

    /// Raw interleaved pixel bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_bytes()
    }

    /// Returns `true` if both handles share the same pixel allocation.
    pub fn ptr_eq(&self, other: &FrameBuffer) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }

    /// Convert 8-bit samples to `f32` in `[0, 1]`, channel-last.
    ///
    /// Layout is `height × width × channels`. Deep frames are reduced to
    /// 8 bits first.
    pub fn to_normalized_f32(&self) -> Vec<f32> {
        let bytes: &[u8] = match self.image.as_ref() {
            DynamicImage::ImageLuma8(buffer) => buffer.as_raw(),
            DynamicImage::ImageRgb8(buffer) => buffer.as_raw(),
            DynamicImage::ImageRgba8(buffer) => buffer.as_raw(),
            other => {
                return other
                    .to_rgb8()
                    .as_raw()
                    .iter()
                    .map(|&sample| sample as f32 / 255.0)
                    .collect();
            }
        };
        bytes.iter().map(|&sample| sample as f32 / 255.0).collect()
    }
}

/// A decoded frame together with where it came from.
///
/// Created by [`VideoSession`](crate::VideoSession); read-only once built.
#[derive(Debug, Clone)]
pub struct FrameData {
    frame: FrameBuffer,
    position: u64,
    timestamp: f64,
}

impl FrameData {
    pub(crate) fn new(frame: FrameBuffer, position: u64, timestamp: f64) -> Self {
        Self {
            frame,
            position,
            timestamp,
        }
    }

    /// The decoded pixels.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Absolute, 0-indexed frame position.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Presentation time in seconds (`position / fps`).
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Take ownership of the pixel buffer.
    pub fn into_frame(self) -> FrameBuffer {
        self.frame
    }
}
