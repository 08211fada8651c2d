use std::f64::consts::PI;

use kurbo::{Arc, Cap, Circle, Ellipse, Join, Rect, Shape as _, Stroke, StrokeOpts};

use crate::{
    document::model::{Element, LineGeometry, ShapeKind},
    foundation::core::{Affine, BezPath, Point, Vec2},
};

/// Device-space geometry for one element, ready to be filled.
///
/// Every shape is reduced to fill areas: line shapes are stroked up front so a rasterizer only
/// needs a fill primitive.
#[derive(Clone, Debug)]
pub struct ShapePaths {
    /// Area painted with the element color.
    pub fill: BezPath,
    /// Outline ring painted with the outline color on top of the fill.
    pub outline: Option<BezPath>,
}

/// Arrow heads are at least this long; longer for thick lines.
const MIN_HEAD_LEN: f64 = 10.0;

/// Build the geometry of `element` at its current position.
pub fn element_paths(element: &Element, tolerance: f64) -> ShapePaths {
    let origin = Point::new(element.x, element.y);
    let fill = match &element.shape.kind {
        ShapeKind::Rectangle { width, height } => {
            Rect::from_origin_size(origin, (*width, *height)).to_path(tolerance)
        }
        ShapeKind::Star { size } => star(origin, *size),
        ShapeKind::Cloud { width, height } => cloud(origin, *width, *height, tolerance),
        ShapeKind::Database { width, height } => database(origin, *width, *height, tolerance),
        ShapeKind::Line(g) => line_family(origin, g, Head::None, tolerance),
        ShapeKind::LineArrow(g) => line_family(origin, g, Head::Open, tolerance),
        ShapeKind::Arrow(g) => line_family(origin, g, Head::Solid, tolerance),
        ShapeKind::Cat { size } => cat(origin, *size, tolerance),
        ShapeKind::Dog { size } => dog(origin, *size, tolerance),
        ShapeKind::Custom(custom) => {
            Affine::translate(origin.to_vec2()) * custom.parsed.clone()
        }
    };

    let outline = element
        .shape
        .outline
        .filter(|o| o.thickness > 0.0)
        .map(|o| {
            let style = Stroke::new(o.thickness).with_join(Join::Miter);
            kurbo::stroke(fill.iter(), &style, &StrokeOpts::default(), tolerance)
        });

    ShapePaths { fill, outline }
}

/// Five-point star centered on `c`; inner radius is half the outer one.
fn star(c: Point, size: f64) -> BezPath {
    const SPIKES: usize = 5;
    let inner = size / 2.0;
    let step = PI / SPIKES as f64;

    let mut path = BezPath::new();
    path.move_to((c.x, c.y - size));
    let mut angle = PI * 1.5;
    for _ in 0..SPIKES {
        path.line_to(c + Vec2::from_angle(angle) * size);
        angle += step;
        path.line_to(c + Vec2::from_angle(angle) * inner);
        angle += step;
    }
    path.close_path();
    path
}

/// Four lobes of radius `width / 4`: left, two on top, right.
fn cloud(p: Point, width: f64, height: f64, tolerance: f64) -> BezPath {
    let r = width / 4.0;
    let lobes = [
        (Point::new(p.x, p.y), PI * 0.5),
        (Point::new(p.x + width / 4.0, p.y - height / 2.0), PI),
        (Point::new(p.x + width / 2.0, p.y - height / 2.0), PI),
        (Point::new(p.x + width, p.y), PI * 1.5),
    ];

    let mut path = BezPath::new();
    for (i, (center, start)) in lobes.into_iter().enumerate() {
        let from = center + Vec2::from_angle(start) * r;
        if i == 0 {
            path.move_to(from);
        } else {
            path.line_to(from);
        }
        half_arc(&mut path, center, Vec2::new(r, r), start, tolerance);
    }
    path.close_path();
    path
}

/// Body rectangle capped by a full top ellipse and the lower half of a bottom ellipse.
fn database(p: Point, width: f64, height: f64, tolerance: f64) -> BezPath {
    let radii = Vec2::new(width / 2.0, height / 4.0);
    let mut path = Ellipse::new(p, radii, 0.0).to_path(tolerance);
    path.extend(
        Rect::new(
            p.x - width / 2.0,
            p.y - height / 2.0,
            p.x + width / 2.0,
            p.y + height / 2.0,
        )
        .path_elements(tolerance),
    );

    let bottom = Point::new(p.x, p.y + height / 2.0);
    path.move_to(bottom + Vec2::new(radii.x, 0.0));
    half_arc(&mut path, bottom, radii, 0.0, tolerance);
    path.close_path();
    path
}

/// Append a clockwise (screen space) half turn starting at `start` radians.
fn half_arc(path: &mut BezPath, center: Point, radii: Vec2, start: f64, tolerance: f64) {
    let arc = Arc::new(center, radii, start, PI, 0.0);
    arc.to_cubic_beziers(tolerance, |p1, p2, p3| path.curve_to(p1, p2, p3));
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Head {
    None,
    Open,
    Solid,
}

/// A segment of `length` from the element position, rotated by `rotation` degrees and stroked
/// with `width`.
fn line_family(p: Point, g: &LineGeometry, head: Head, tolerance: f64) -> BezPath {
    let xf = Affine::translate(p.to_vec2()) * Affine::rotate(g.rotation.to_radians());
    let head_len = MIN_HEAD_LEN.max(g.width * 2.0);
    let tip = Point::new(g.length, 0.0);
    // A solid head abuts the shaft instead of overlapping it.
    let shaft_end = match head {
        Head::Solid => Point::new((g.length - head_len).max(0.0), 0.0),
        _ => tip,
    };

    let mut center = BezPath::new();
    center.move_to((0.0, 0.0));
    center.line_to(shaft_end);
    if head == Head::Open {
        center.move_to((g.length - head_len, -head_len / 2.0));
        center.line_to(tip);
        center.line_to((g.length - head_len, head_len / 2.0));
    }

    let style = Stroke::new(g.width)
        .with_caps(Cap::Butt)
        .with_join(Join::Miter);
    let mut out = kurbo::stroke(
        (xf * center).iter(),
        &style,
        &StrokeOpts::default(),
        tolerance,
    );

    if head == Head::Solid {
        let half = (head_len + g.width) / 2.0;
        let mut tri = BezPath::new();
        tri.move_to(tip);
        tri.line_to((shaft_end.x, half));
        tri.line_to((shaft_end.x, -half));
        tri.close_path();
        out.extend((xf * tri).iter());
    }
    out
}

/// Round head of radius `size` with two pointed ears.
fn cat(c: Point, size: f64, tolerance: f64) -> BezPath {
    let mut path = Circle::new(c, size).to_path(tolerance);
    // Both ears wind the same way as the head so the union stays solid.
    let left = [(-0.95, -0.35), (-0.6, -1.3), (-0.15, -0.95)];
    let right = [(0.15, -0.95), (0.6, -1.3), (0.95, -0.35)];
    for ear in [left, right] {
        let [a, b, d] = ear.map(|(dx, dy)| c + Vec2::new(dx, dy) * size);
        path.move_to(a);
        path.line_to(b);
        path.line_to(d);
        path.close_path();
    }
    path
}

/// Round head of radius `size` with two floppy ears hanging at the sides.
fn dog(c: Point, size: f64, tolerance: f64) -> BezPath {
    let mut path = Circle::new(c, size).to_path(tolerance);
    let radii = Vec2::new(0.35 * size, 0.7 * size);
    for (dx, tilt) in [(-0.9, 0.3), (0.9, -0.3)] {
        let ear = Ellipse::new(c + Vec2::new(dx * size, -0.1 * size), radii, tilt);
        path.extend(ear.path_elements(tolerance));
    }
    path
}

#[cfg(test)]
#[path = "../../tests/unit/render/shapes.rs"]
mod tests;
