//! In-memory frame buffer of one detection run.

use crate::detection::DetectionRecord;
use image::RgbImage;

/// One processed frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame with detections drawn on it.
    pub processed: RgbImage,
    /// Detections found in the frame.
    pub detections: Vec<DetectionRecord>,
    /// Frame as captured, before annotation.
    pub original: RgbImage,
}

/// Ordered frames of the current run.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: Vec<Frame>,
}

impl FrameBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Drop every buffered frame.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of buffered frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame is buffered.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Most recently buffered frame.
    pub fn latest(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Frames in buffer order.
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Processed images in buffer order.
    pub fn processed_images(&self) -> impl ExactSizeIterator<Item = &RgbImage> {
        self.frames.iter().map(|f| &f.processed)
    }
}

impl<'a> IntoIterator for &'a FrameBuffer {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
