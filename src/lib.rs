//! motiongram renders animated vector diagrams from declarative documents.
//!
//! A document lists **elements** (positioned, styled shapes with optional labels) and
//! **movements** (time windows that interpolate an element along x and/or y). A [`Session`] runs
//! the animation: every tick resolves each element's position, draws the whole canvas and captures
//! the frame. Captured frames can then be exported as an animated GIF or a PNG sequence.
//!
//! # Pipeline overview
//!
//! 1. **Load**: YAML/JSON text -> [`Document`] (validated, every default applied once)
//! 2. **Resolve**: `Document + elapsed` -> element positions ([`resolve_all`])
//! 3. **Render**: elements -> [`FrameRGBA`] (premultiplied RGBA8, CPU backend)
//! 4. **Export**: [`FrameBuffer`] -> GIF / PNG files through a [`FrameSink`]
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Explicit time**: runs read time from a [`HostClock`], so the same document renders
//!   identically in virtual time and in real time.
//! - **Premultiplied RGBA8** out of the renderer; sinks receive straight alpha.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod document;
mod encode;
mod foundation;
mod playback;
mod render;

pub use animation::interp::{Strategy, cosine, linear};
pub use animation::resolver::{RunState, resolve_all, resolve_element};
pub use document::color::parse_color;
pub use document::load::{Document, DocumentFormat};
pub use document::model::{
    Axis, CustomShape, Element, Label, LineGeometry, Movement, Outline, OverlapWarning, Shape,
    ShapeKind, find_overlaps,
};
pub use encode::gif::{GifOpts, GifSink, write_gif};
pub use encode::sink::{
    FrameSink, InMemorySink, PngSequenceSink, SinkConfig, export_frames, save_png, to_rgba_image,
};
pub use foundation::core::{Affine, BezPath, Canvas, Millis, Point, Rgba8, Vec2};
pub use foundation::error::{MotiongramError, MotiongramResult};
pub use playback::clock::{AnimationClock, ClockState, RunId, StopHandle, TickTicket};
pub use playback::frames::{CapturedFrame, FrameBuffer};
pub use playback::host::{HostClock, SystemClock, VirtualClock};
pub use playback::session::{Session, SessionOpts, TickOutcome};
pub use render::backend::{BackendKind, FrameRGBA, RenderSettings, ShapeRenderer, create_backend};
pub use render::cpu::CpuRenderer;
pub use render::shapes::{ShapePaths, element_paths};

/// GIF loop setting, re-exported for [`GifOpts::repeat`].
pub use image::codecs::gif::Repeat as GifRepeat;
