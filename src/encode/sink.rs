use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    foundation::error::{MotiongramError, MotiongramResult},
    playback::frames::{CapturedFrame, FrameBuffer},
    render::backend::FrameRGBA,
};

/// Frames converted to straight alpha per parallel batch.
const EXPORT_CHUNK: usize = 64;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Number of frames that will be pushed.
    pub frames: usize,
}

/// Sink contract for consuming captured frames in capture order.
///
/// Ordering contract: `push_frame` is called with strictly increasing indices starting at 0, and
/// every image has the size announced in `begin`.
pub trait FrameSink {
    /// Prepare for a sequence of frames.
    fn begin(&mut self, cfg: SinkConfig) -> MotiongramResult<()>;
    /// Consume one straight-alpha frame.
    fn push_frame(&mut self, idx: usize, frame: &image::RgbaImage) -> MotiongramResult<()>;
    /// Finish the sequence.
    fn end(&mut self) -> MotiongramResult<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn begin(&mut self, cfg: SinkConfig) -> MotiongramResult<()> {
        (**self).begin(cfg)
    }

    fn push_frame(&mut self, idx: usize, frame: &image::RgbaImage) -> MotiongramResult<()> {
        (**self).push_frame(idx, frame)
    }

    fn end(&mut self) -> MotiongramResult<()> {
        (**self).end()
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    /// Frames in capture order.
    pub frames: Vec<(usize, image::RgbaImage)>,
    finished: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration seen in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> MotiongramResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &image::RgbaImage) -> MotiongramResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> MotiongramResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes every frame as `frame_00000.png`, `frame_00001.png`, ... into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: usize,
}

impl PngSequenceSink {
    /// Sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }

    /// Path of frame `idx`.
    pub fn frame_path(&self, idx: usize) -> PathBuf {
        self.dir.join(format!("frame_{idx:05}.png"))
    }

    /// Frames written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, _cfg: SinkConfig) -> MotiongramResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create frames dir '{}'", self.dir.display()))?;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &image::RgbaImage) -> MotiongramResult<()> {
        let path = self.frame_path(idx);
        frame
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| MotiongramError::export(format!("write '{}': {e}", path.display())))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> MotiongramResult<()> {
        tracing::info!(dir = %self.dir.display(), frames = self.written, "png sequence written");
        Ok(())
    }
}

/// Stream every frame of `frames`, in order, into `sink`.
///
/// Premultiplied pixels are converted to straight alpha in parallel batches; the sink itself is
/// always fed sequentially. The buffer is never modified, even when the sink fails.
#[tracing::instrument(skip_all, fields(frames = frames.len()))]
pub fn export_frames<S: FrameSink + ?Sized>(
    frames: &FrameBuffer,
    sink: &mut S,
) -> MotiongramResult<()> {
    let Some(first) = frames.as_slice().first() else {
        return Err(MotiongramError::export("no frames to export"));
    };
    let (width, height) = (first.image.width, first.image.height);
    if let Some(bad) = frames
        .iter()
        .position(|f| f.image.width != width || f.image.height != height)
    {
        return Err(MotiongramError::export(format!(
            "frame {bad} is not {width}x{height}"
        )));
    }

    sink.begin(SinkConfig {
        width,
        height,
        frames: frames.len(),
    })?;
    for (chunk_idx, chunk) in frames.as_slice().chunks(EXPORT_CHUNK).enumerate() {
        let images = chunk
            .par_iter()
            .map(|f: &CapturedFrame| to_rgba_image(&f.image))
            .collect::<MotiongramResult<Vec<_>>>()?;
        for (i, img) in images.iter().enumerate() {
            sink.push_frame(chunk_idx * EXPORT_CHUNK + i, img)?;
        }
    }
    sink.end()
}

/// Straight-alpha copy of a frame.
pub fn to_rgba_image(frame: &FrameRGBA) -> MotiongramResult<image::RgbaImage> {
    image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
        .ok_or_else(|| MotiongramError::export("frame byte length does not match its size"))
}

/// Write a single frame as a PNG file.
pub fn save_png(frame: &FrameRGBA, path: &Path) -> MotiongramResult<()> {
    let data = frame.to_straight_rgba8();
    image::save_buffer_with_format(
        path,
        &data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| MotiongramError::export(format!("write png '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
