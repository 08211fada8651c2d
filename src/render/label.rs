use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    document::model::Label,
    foundation::error::{MotiongramError, MotiongramResult},
};

/// Identity of a rasterized label; position is not part of it, so one raster serves every frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct LabelKey {
    value: String,
    font: String,
    style: String,
    color: [u8; 4],
}

impl LabelKey {
    pub(crate) fn of(label: &Label) -> Self {
        let c = label.color;
        Self {
            value: label.value.clone(),
            font: label.font.clone(),
            style: label.style.clone(),
            color: [c.r, c.g, c.b, c.a],
        }
    }
}

/// A label rendered to a small premultiplied RGBA8 image.
#[derive(Clone, Debug)]
pub(crate) struct LabelSprite {
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Distance from the top of the image to the text baseline.
    pub(crate) baseline: f64,
    pub(crate) rgba8_premul: Vec<u8>,
}

/// Font database shared by every label of a renderer.
pub(crate) fn build_label_fontdb(
    system_fonts: bool,
    font_dirs: &[PathBuf],
) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    if system_fonts {
        db.load_system_fonts();
    }
    for dir in font_dirs {
        db.load_fonts_dir(dir);
    }
    tracing::debug!(faces = db.len(), "label font database ready");
    Arc::new(db)
}

/// Rasterize `label`, or `None` when it has no text.
pub(crate) fn rasterize_label(
    fontdb: &Arc<usvg::fontdb::Database>,
    label: &Label,
) -> MotiongramResult<Option<LabelSprite>> {
    if label.value.is_empty() {
        return Ok(None);
    }

    let layout = SpriteLayout::for_label(label);
    let svg = label_svg(label, &layout);
    let opts = usvg::Options {
        fontdb: Arc::clone(fontdb),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| MotiongramError::render(format!("label svg: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(layout.width, layout.height)
        .ok_or_else(|| MotiongramError::render("failed to allocate label pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    Ok(Some(LabelSprite {
        width: layout.width,
        height: layout.height,
        baseline: layout.baseline,
        rgba8_premul: pixmap.data().to_vec(),
    }))
}

#[derive(Clone, Copy, Debug)]
struct SpriteLayout {
    width: u32,
    height: u32,
    baseline: f64,
}

impl SpriteLayout {
    /// Generous box: one em per character plus an em of padding, with room for descenders.
    fn for_label(label: &Label) -> Self {
        const MAX_DIM: f64 = 8_192.0;
        let size = label.font_size_px();
        let chars = label.value.chars().count().max(1) as f64;
        Self {
            width: (size * (chars + 1.0)).ceil().clamp(1.0, MAX_DIM) as u32,
            height: (size * 2.0).ceil().clamp(1.0, MAX_DIM) as u32,
            baseline: (size * 1.5).min(MAX_DIM),
        }
    }
}

fn label_svg(label: &Label, layout: &SpriteLayout) -> String {
    let bold = label.style == "bold"
        || label
            .font
            .split_whitespace()
            .any(|t| t.eq_ignore_ascii_case("bold"));
    let font_style = match label.style.as_str() {
        "italic" | "oblique" => label.style.as_str(),
        _ => "normal",
    };
    let c = label.color;
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}">"#,
            r#"<text x="0" y="{baseline}" font-family="{family}" font-size="{size}" "#,
            r#"font-style="{font_style}" font-weight="{weight}" "#,
            r#"fill="rgb({r},{g},{b})" fill-opacity="{opacity}">{text}</text></svg>"#
        ),
        w = layout.width,
        h = layout.height,
        baseline = layout.baseline,
        family = xml_escape(&label.font_family()),
        size = label.font_size_px(),
        font_style = font_style,
        weight = if bold { "bold" } else { "normal" },
        r = c.r,
        g = c.g,
        b = c.b,
        opacity = f64::from(c.a) / 255.0,
        text = xml_escape(&label.value),
    )
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
