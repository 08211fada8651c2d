use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::{
    encode::sink::{FrameSink, SinkConfig, export_frames},
    foundation::error::{MotiongramError, MotiongramResult},
    playback::frames::FrameBuffer,
};

/// Animated GIF output options.
#[derive(Clone, Copy, Debug)]
pub struct GifOpts {
    /// Delay between frames in milliseconds.
    pub delay_ms: u32,
    /// Quantization speed, 1 (best) to 30 (fastest).
    pub speed: i32,
    /// Loop behaviour.
    pub repeat: Repeat,
}

impl Default for GifOpts {
    fn default() -> Self {
        Self {
            delay_ms: 20,
            speed: 10,
            repeat: Repeat::Infinite,
        }
    }
}

/// GIF encoder as a [`FrameSink`].
///
/// The file trailer is written when the sink ends (or is dropped). The encoder drops its writer
/// without reporting errors, so writers that can fail on the final bytes should be buffered in
/// memory first, as [`write_gif`] does.
pub struct GifSink<W: Write> {
    encoder: Option<GifEncoder<W>>,
    opts: GifOpts,
    written: usize,
}

impl<W: Write> GifSink<W> {
    /// Encoder writing to `writer`.
    pub fn new(writer: W, opts: GifOpts) -> MotiongramResult<Self> {
        if !(1..=30).contains(&opts.speed) {
            return Err(MotiongramError::export(format!(
                "gif speed must be in 1..=30, got {}",
                opts.speed
            )));
        }
        Ok(Self {
            encoder: Some(GifEncoder::new_with_speed(writer, opts.speed)),
            opts,
            written: 0,
        })
    }

    /// Frames encoded so far.
    pub fn written(&self) -> usize {
        self.written
    }

    fn encoder(&mut self) -> MotiongramResult<&mut GifEncoder<W>> {
        self.encoder
            .as_mut()
            .ok_or_else(|| MotiongramError::export("gif sink already finished"))
    }
}

impl<W: Write> FrameSink for GifSink<W> {
    fn begin(&mut self, cfg: SinkConfig) -> MotiongramResult<()> {
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(MotiongramError::export(format!(
                "{}x{} is too large for gif",
                cfg.width, cfg.height
            )));
        }
        let repeat = self.opts.repeat;
        self.encoder()?
            .set_repeat(repeat)
            .map_err(|e| MotiongramError::export(format!("gif header: {e}")))?;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: usize, frame: &image::RgbaImage) -> MotiongramResult<()> {
        let delay = Delay::from_numer_denom_ms(self.opts.delay_ms, 1);
        self.encoder()?
            .encode_frame(Frame::from_parts(frame.clone(), 0, 0, delay))
            .map_err(|e| MotiongramError::export(format!("gif frame {idx}: {e}")))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> MotiongramResult<()> {
        // Dropping the encoder writes the trailer.
        drop(self.encoder.take());
        tracing::debug!(frames = self.written, "gif finished");
        Ok(())
    }
}

/// Encode `frames` into a GIF file at `path`.
#[tracing::instrument(skip(frames), fields(frames = frames.len()))]
pub fn write_gif(frames: &FrameBuffer, path: &Path, opts: GifOpts) -> MotiongramResult<()> {
    if frames.is_empty() {
        return Err(MotiongramError::export("no frames to export"));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let mut bytes = Vec::new();
    let written = {
        let mut sink = GifSink::new(&mut bytes, opts)?;
        export_frames(frames, &mut sink)?;
        sink.written()
    };
    std::fs::write(path, &bytes)
        .map_err(|e| MotiongramError::export(format!("write gif '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), frames = written, bytes = bytes.len(), "gif written");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
