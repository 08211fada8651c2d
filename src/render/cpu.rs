use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    document::model::Element,
    foundation::core::{Canvas, Point, Rgba8},
    foundation::error::{MotiongramError, MotiongramResult},
    render::backend::{FrameRGBA, RenderSettings, ShapeRenderer},
    render::label::{LabelKey, LabelSprite, build_label_fontdb, rasterize_label},
    render::shapes::element_paths,
};

/// CPU renderer backed by `vello_cpu`.
///
/// Label rasters are cached across frames, so a run only pays for text once per distinct label.
pub struct CpuRenderer {
    settings: RenderSettings,
    fontdb: Option<Arc<usvg::fontdb::Database>>,
    label_cache: HashMap<LabelKey, Option<LabelPaint>>,
    pixmap: Option<(Canvas, vello_cpu::Pixmap)>,
}

#[derive(Clone)]
struct LabelPaint {
    image: vello_cpu::Image,
    width: f64,
    height: f64,
    baseline: f64,
}

impl CpuRenderer {
    /// New renderer; the font database is loaded on the first label.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            fontdb: None,
            label_cache: HashMap::new(),
            pixmap: None,
        }
    }

    fn label_paint(&mut self, element: &Element) -> MotiongramResult<Option<LabelPaint>> {
        let key = LabelKey::of(&element.label);
        if let Some(paint) = self.label_cache.get(&key) {
            return Ok(paint.clone());
        }

        let fontdb = self
            .fontdb
            .get_or_insert_with(|| {
                build_label_fontdb(self.settings.system_fonts, &self.settings.font_dirs)
            })
            .clone();
        let paint = rasterize_label(&fontdb, &element.label)?
            .map(|sprite| sprite_to_paint(&sprite))
            .transpose()?;
        self.label_cache.insert(key, paint.clone());
        Ok(paint)
    }
}

impl ShapeRenderer for CpuRenderer {
    #[tracing::instrument(level = "trace", skip(self, elements), fields(elements = elements.len()))]
    fn render(
        &mut self,
        canvas: Canvas,
        background: Rgba8,
        elements: &[Element],
    ) -> MotiongramResult<FrameRGBA> {
        let (w, h) = surface_dims(canvas)?;
        let tolerance = self.settings.tolerance;

        let mut labels = Vec::with_capacity(elements.len());
        for el in elements {
            labels.push(self.label_paint(el)?);
        }

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));

        for (el, label) in elements.iter().zip(&labels) {
            let paths = element_paths(el, tolerance);
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(el.color));
            ctx.fill_path(&bezpath_to_cpu(&paths.fill));
            if let (Some(ring), Some(outline)) = (&paths.outline, el.shape.outline) {
                ctx.set_paint(color_to_cpu(outline.color));
                ctx.fill_path(&bezpath_to_cpu(ring));
            }

            if let Some(label) = label {
                let x = el.x + el.label.offset_x;
                let y = el.y + el.label.offset_y - label.baseline;
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
                ctx.set_paint(label.image.clone());
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    label.width,
                    label.height,
                ));
            }
        }

        ctx.flush();
        if self.pixmap.as_ref().is_none_or(|(c, _)| *c != canvas) {
            self.pixmap = Some((canvas, vello_cpu::Pixmap::new(w, h)));
        }
        let Some((_, pixmap)) = self.pixmap.as_mut() else {
            return Err(MotiongramError::render("render surface missing"));
        };
        clear_pixmap(pixmap);
        ctx.render_to_pixmap(pixmap);

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn surface_dims(canvas: Canvas) -> MotiongramResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| MotiongramError::render("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| MotiongramError::render("canvas height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(MotiongramError::render("canvas width/height must be > 0"));
    }
    Ok((w, h))
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &crate::foundation::core::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn sprite_to_paint(sprite: &LabelSprite) -> MotiongramResult<LabelPaint> {
    let w: u16 = sprite
        .width
        .try_into()
        .map_err(|_| MotiongramError::render("label width exceeds u16"))?;
    let h: u16 = sprite
        .height
        .try_into()
        .map_err(|_| MotiongramError::render("label height exceeds u16"))?;
    if sprite.rgba8_premul.len() != sprite.width as usize * sprite.height as usize * 4 {
        return Err(MotiongramError::render("label raster byte length mismatch"));
    }

    let pixels = sprite
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);

    Ok(LabelPaint {
        image: vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        },
        width: f64::from(sprite.width),
        height: f64::from(sprite.height),
        baseline: sprite.baseline,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
