use crate::{foundation::core::Millis, playback::clock::RunId, render::backend::FrameRGBA};

/// One captured tick.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedFrame {
    /// Run that captured the frame.
    pub run: RunId,
    /// Elapsed run time the elements were resolved at.
    pub elapsed_ms: Millis,
    /// Whole-canvas pixels (premultiplied RGBA8).
    pub image: FrameRGBA,
}

/// Ordered frames of the current (or most recent) run.
///
/// Append-only while a run is active and emptied when the next run starts.
#[derive(Clone, Debug, Default)]
pub struct FrameBuffer {
    frames: Vec<CapturedFrame>,
}

impl FrameBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame.
    pub fn push(&mut self, frame: CapturedFrame) {
        self.frames.push(frame);
    }

    /// Drop every frame.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in capture order.
    pub fn iter(&self) -> std::slice::Iter<'_, CapturedFrame> {
        self.frames.iter()
    }

    /// Frames in capture order, as a slice.
    pub fn as_slice(&self) -> &[CapturedFrame] {
        &self.frames
    }

    /// Most recent frame.
    pub fn last(&self) -> Option<&CapturedFrame> {
        self.frames.last()
    }
}

impl<'a> IntoIterator for &'a FrameBuffer {
    type Item = &'a CapturedFrame;
    type IntoIter = std::slice::Iter<'a, CapturedFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
