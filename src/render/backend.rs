use std::path::PathBuf;

use crate::{
    document::model::Element,
    foundation::core::{Canvas, Rgba8},
    foundation::error::MotiongramResult,
};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** by default. The `premultiplied` flag is included to make this
/// explicit at API boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA8 bytes of the pixel at `(x, y)`, if inside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy of the pixels with straight (non-premultiplied) alpha.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Draws a full set of elements at their current positions.
///
/// This is the seam between the animation engine and rasterization: the engine only hands over
/// resolved elements and gets pixels back.
pub trait ShapeRenderer {
    /// Draw `elements` in order over a `background`-filled canvas and read the result back.
    fn render(
        &mut self,
        canvas: Canvas,
        background: Rgba8,
        elements: &[Element],
    ) -> MotiongramResult<FrameRGBA>;
}

impl<R: ShapeRenderer + ?Sized> ShapeRenderer for Box<R> {
    fn render(
        &mut self,
        canvas: Canvas,
        background: Rgba8,
        elements: &[Element],
    ) -> MotiongramResult<FrameRGBA> {
        (**self).render(canvas, background, elements)
    }
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// Flattening tolerance for curves, in pixels.
    pub tolerance: f64,
    /// Load the system font database for labels.
    pub system_fonts: bool,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` label fonts.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// Create a rendering backend implementation.
pub fn create_backend(kind: BackendKind, settings: &RenderSettings) -> Box<dyn ShapeRenderer> {
    match kind {
        BackendKind::Cpu => Box::new(crate::render::cpu::CpuRenderer::new(settings.clone())),
    }
}
