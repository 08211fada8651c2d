use crate::foundation::error::{MotiongramError, MotiongramResult};

pub use kurbo::{Affine, BezPath, Point, Vec2};

/// Logical time in milliseconds since the start of a run.
pub type Millis = f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Output raster dimensions in pixels.
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Largest edge the CPU rasterizer can address.
    pub const MAX_DIM: u32 = u16::MAX as u32;

    /// Build a canvas, rejecting empty or oversized surfaces.
    pub fn new(width: u32, height: u32) -> MotiongramResult<Self> {
        if width == 0 || height == 0 {
            return Err(MotiongramError::validation(
                "canvas width/height must be > 0",
            ));
        }
        if width > Self::MAX_DIM || height > Self::MAX_DIM {
            return Err(MotiongramError::validation(format!(
                "canvas {width}x{height} exceeds {max}x{max}",
                max = Self::MAX_DIM
            )));
        }
        Ok(Self { width, height })
    }

    /// Byte length of a tightly packed RGBA8 surface of this size.
    pub fn rgba8_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque color from RGB channels.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Premultiplied `[r, g, b, a]` bytes (r,g,b already multiplied by a).
    pub fn to_premul_bytes(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }
        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }

    /// CSS hex form (`#rrggbb` or `#rrggbbaa`), used when handing colors to SVG.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}
