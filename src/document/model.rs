use crate::foundation::core::{BezPath, Rgba8};

fn ser_hex<S: serde::Serializer>(c: &Rgba8, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&c.to_hex())
}

#[derive(Clone, Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// A positioned, styled shape: the unit that is animated and drawn.
///
/// Elements are produced by the loader with every default applied; the only field that changes
/// after loading is the current position (`x`, `y`).
pub struct Element {
    /// Unique element name; movements refer to elements by this name.
    pub name: String,
    /// Declared start x.
    pub start_x: f64,
    /// Declared start y.
    pub start_y: f64,
    /// Current x position.
    #[serde(skip)]
    pub x: f64,
    /// Current y position.
    #[serde(skip)]
    pub y: f64,
    /// Fill color.
    #[serde(serialize_with = "ser_hex")]
    pub color: Rgba8,
    /// Resolved shape geometry parameters.
    pub shape: Shape,
    /// Resolved label.
    pub label: Label,
}

impl Element {
    /// Move the element back to its declared start position.
    pub fn rewind(&mut self) {
        self.x = self.start_x;
        self.y = self.start_y;
    }

    /// Current position.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Shape of an element with an optional outline.
pub struct Shape {
    /// Kind-specific parameters.
    pub kind: ShapeKind,
    /// Optional outline stroke.
    pub outline: Option<Outline>,
}

#[derive(Clone, Debug, PartialEq)]
/// One variant per drawable shape kind, with every parameter resolved.
pub enum ShapeKind {
    /// Axis-aligned rectangle anchored at its top-left corner.
    Rectangle {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
    /// Five-point star centered on the element position.
    Star {
        /// Outer radius in pixels.
        size: f64,
    },
    /// Cloud made of overlapping lobes.
    Cloud {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
    /// Database cylinder.
    Database {
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
    /// Plain line.
    Line(LineGeometry),
    /// Line with an arrow head at its end.
    LineArrow(LineGeometry),
    /// Arrow.
    Arrow(LineGeometry),
    /// Cat face.
    Cat {
        /// Head radius in pixels.
        size: f64,
    },
    /// Dog face.
    Dog {
        /// Head radius in pixels.
        size: f64,
    },
    /// User-supplied SVG path, drawn relative to the element position.
    Custom(CustomShape),
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Parameters shared by the line family.
pub struct LineGeometry {
    /// Line length in pixels.
    pub length: f64,
    /// Rotation in degrees, clockwise in canvas space.
    pub rotation: f64,
    /// Stroke width in pixels.
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// User-supplied SVG path data.
pub struct CustomShape {
    /// Path data as declared.
    pub path: String,
    /// Parsed path.
    #[serde(skip)]
    pub parsed: BezPath,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Outline stroke drawn on top of a shape's fill.
pub struct Outline {
    /// Stroke thickness in pixels.
    pub thickness: f64,
    /// Stroke color.
    #[serde(serialize_with = "ser_hex")]
    pub color: Rgba8,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Text drawn next to an element.
pub struct Label {
    /// Horizontal offset from the element position.
    pub offset_x: f64,
    /// Vertical offset (to the text baseline) from the element position.
    pub offset_y: f64,
    /// CSS-like font shorthand, e.g. `14px Arial`.
    pub font: String,
    /// Font style keyword (`normal`, `italic`, `oblique`, `bold`).
    pub style: String,
    /// Text color.
    #[serde(serialize_with = "ser_hex")]
    pub color: Rgba8,
    /// Text; empty labels are not drawn.
    pub value: String,
}

impl Default for Label {
    fn default() -> Self {
        Self {
            offset_x: 10.0,
            offset_y: 10.0,
            font: "14px Arial".to_string(),
            style: "normal".to_string(),
            color: Rgba8::BLACK,
            value: String::new(),
        }
    }
}

impl Label {
    /// Font size in pixels parsed from [`Label::font`] (`14` when absent).
    pub fn font_size_px(&self) -> f64 {
        self.font
            .split_whitespace()
            .find_map(|tok| tok.strip_suffix("px").and_then(|n| n.parse::<f64>().ok()))
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(14.0)
    }

    /// Font family parsed from [`Label::font`]: everything after the size token.
    pub fn font_family(&self) -> String {
        let mut family = Vec::new();
        let mut seen_size = false;
        for tok in self.font.split_whitespace() {
            if seen_size {
                family.push(tok);
            } else if tok.ends_with("px") {
                seen_size = true;
            }
        }
        if family.is_empty() {
            "sans-serif".to_string()
        } else {
            family.join(" ")
        }
    }
}

impl ShapeKind {
    /// Canonical kind name as written in documents.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Rectangle { .. } => "rectangle",
            Self::Star { .. } => "star",
            Self::Cloud { .. } => "cloud",
            Self::Database { .. } => "database",
            Self::Line(_) => "line",
            Self::LineArrow(_) => "line-arrow",
            Self::Arrow(_) => "arrow",
            Self::Cat { .. } => "cat",
            Self::Dog { .. } => "dog",
            Self::Custom(_) => "custom",
        }
    }

    /// Resolved numeric parameters in declaration order.
    pub fn params(&self) -> Vec<(&'static str, f64)> {
        match self {
            Self::Rectangle { width, height }
            | Self::Cloud { width, height }
            | Self::Database { width, height } => vec![("width", *width), ("height", *height)],
            Self::Star { size } | Self::Cat { size } | Self::Dog { size } => vec![("size", *size)],
            Self::Line(g) | Self::LineArrow(g) | Self::Arrow(g) => vec![
                ("length", g.length),
                ("rotation", g.rotation),
                ("width", g.width),
            ],
            Self::Custom(_) => Vec::new(),
        }
    }
}

impl serde::Serialize for Shape {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut m = s.serialize_map(None)?;
        match &self.kind {
            ShapeKind::Custom(custom) => m.serialize_entry("custom", custom)?,
            kind => {
                m.serialize_entry("premade", kind.kind_name())?;
                for (key, value) in kind.params() {
                    m.serialize_entry(key, &value)?;
                }
            }
        }
        if let Some(outline) = &self.outline {
            m.serialize_entry("outline", outline)?;
        }
        m.end()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A time-windowed instruction to interpolate one element along one or both axes.
///
/// Movements are immutable once loaded. The origin captured when a movement first becomes active
/// is per-run state and lives in [`crate::RunState`].
pub struct Movement {
    /// Name of the target element.
    pub name: String,
    /// Instant (ms since run start) at which the movement becomes active.
    pub time_start: f64,
    /// Instant at which progress reaches 1.
    pub time_end: f64,
    /// Explicit x origin; defaults to the element's x when the movement activates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_x: Option<f64>,
    /// Explicit y origin; defaults to the element's y when the movement activates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_y: Option<f64>,
    /// Target x; `None` leaves the x axis alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
    /// Target y; `None` leaves the y axis alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_y: Option<f64>,
    /// Interpolation strategy name (`linear` or `cosine`).
    pub strategy: String,
}

impl Movement {
    /// Progress at `elapsed`, clamped above at 1.
    pub fn progress(&self, elapsed: f64) -> f64 {
        ((elapsed - self.time_start) / (self.time_end - self.time_start)).min(1.0)
    }

    /// Whether the movement is active at `elapsed` (started, finished or not).
    pub fn is_active(&self, elapsed: f64) -> bool {
        elapsed >= self.time_start
    }

    /// Whether `later`, declared after `self`, writes the same axes before `self` has finished.
    /// Started movements keep writing past their end, so `later` wins from then on.
    fn overridden_by(&self, later: &Movement) -> bool {
        later.time_start < self.time_end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
/// Position axis.
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// A later-declared movement drives the same element axis before an earlier one has finished, so
/// it overrides the earlier one from then on.
pub struct OverlapWarning {
    /// Element name.
    pub element: String,
    /// Axis both movements declare.
    pub axis: Axis,
    /// Index of the earlier movement in document order.
    pub first: usize,
    /// Index of the later movement, which overrides the earlier one.
    pub second: usize,
}

/// Find same-axis movement pairs where the later-declared one starts before the earlier one ends.
///
/// Back-to-back chains (`b.timeStart >= a.timeEnd`) are not reported.
pub fn find_overlaps(movements: &[Movement]) -> Vec<OverlapWarning> {
    let mut out = Vec::new();
    for (i, a) in movements.iter().enumerate() {
        for (j, b) in movements.iter().enumerate().skip(i + 1) {
            if a.name != b.name || !a.overridden_by(b) {
                continue;
            }
            for (axis, both) in [
                (Axis::X, a.end_x.is_some() && b.end_x.is_some()),
                (Axis::Y, a.end_y.is_some() && b.end_y.is_some()),
            ] {
                if both {
                    out.push(OverlapWarning {
                        element: a.name.clone(),
                        axis,
                        first: i,
                        second: j,
                    });
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
