use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context as _;

use crate::{
    document::color::resolve_color,
    document::model::{
        CustomShape, Element, Label, LineGeometry, Movement, OverlapWarning, Outline, Shape,
        ShapeKind, find_overlaps,
    },
    foundation::core::{BezPath, Rgba8},
    foundation::error::{MotiongramError, MotiongramResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Textual encodings accepted by the loader.
pub enum DocumentFormat {
    /// YAML (also accepts JSON, which is a YAML subset in practice).
    Yaml,
    /// Strict JSON.
    Json,
}

impl DocumentFormat {
    /// Pick a format from a file extension (`.json` is JSON, everything else YAML).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

#[derive(Clone, Debug)]
/// A loaded diagram: validated, defaulted elements plus the movement list in document order.
pub struct Document {
    /// Elements in document order.
    pub elements: Vec<Element>,
    /// Movements in document order.
    pub movements: Vec<Movement>,
    /// Same-axis movements whose windows overlap (later ones override earlier ones).
    pub overlaps: Vec<OverlapWarning>,
}

#[derive(serde::Deserialize)]
struct RawDocument {
    #[serde(default)]
    objects: Option<Vec<RawElement>>,
    #[serde(default)]
    movements: Option<Vec<RawMovement>>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMovement {
    name: Option<String>,
    time_start: Option<f64>,
    time_end: Option<f64>,
    start_x: Option<f64>,
    start_y: Option<f64>,
    end_x: Option<f64>,
    end_y: Option<f64>,
    strategy: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    name: Option<String>,
    start_x: Option<f64>,
    start_y: Option<f64>,
    color: Option<String>,
    shape: Option<RawShape>,
    label: Option<RawLabel>,
}

#[derive(serde::Deserialize)]
struct RawShape {
    premade: Option<String>,
    custom: Option<serde_json::Value>,
    width: Option<f64>,
    height: Option<f64>,
    size: Option<f64>,
    length: Option<f64>,
    rotation: Option<f64>,
    outline: Option<RawOutline>,
}

#[derive(serde::Deserialize)]
struct RawOutline {
    thickness: Option<f64>,
    color: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLabel {
    offset_x: Option<f64>,
    offset_y: Option<f64>,
    font: Option<String>,
    style: Option<String>,
    color: Option<String>,
    value: Option<String>,
}

impl Document {
    /// Parse and validate a document from text.
    pub fn parse(text: &str, format: DocumentFormat) -> MotiongramResult<Self> {
        let raw: RawDocument = match format {
            DocumentFormat::Yaml => {
                serde_yaml::from_str(text).map_err(|e| MotiongramError::serde(e.to_string()))?
            }
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| MotiongramError::serde(e.to_string()))?
            }
        };
        Self::from_raw(raw)
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> MotiongramResult<Self> {
        Self::parse(text, DocumentFormat::Yaml)
    }

    /// Parse a JSON document.
    pub fn from_json_str(text: &str) -> MotiongramResult<Self> {
        Self::parse(text, DocumentFormat::Json)
    }

    /// Read and parse a document file; the format follows the file extension.
    #[tracing::instrument]
    pub fn from_path(path: &Path) -> MotiongramResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read document '{}'", path.display()))?;
        Self::parse(&text, DocumentFormat::from_path(path))
    }

    /// Look up an element by name; the record carries every loader default.
    pub fn element_with_defaults(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Render one element, with every default applied, as YAML.
    pub fn describe_element(&self, name: &str) -> MotiongramResult<String> {
        let element = self
            .element_with_defaults(name)
            .ok_or_else(|| MotiongramError::validation(format!("no element named '{name}'")))?;
        serde_yaml::to_string(element).map_err(|e| MotiongramError::serde(e.to_string()))
    }

    fn from_raw(raw: RawDocument) -> MotiongramResult<Self> {
        let mut seen = BTreeSet::new();
        let mut elements = Vec::new();
        for (index, el) in raw.objects.unwrap_or_default().into_iter().enumerate() {
            let element = resolve_element(index, el)?;
            if !seen.insert(element.name.clone()) {
                return Err(MotiongramError::validation(format!(
                    "duplicate element name '{}'",
                    element.name
                )));
            }
            elements.push(element);
        }

        let movements = raw
            .movements
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, m)| resolve_movement(index, m))
            .collect::<MotiongramResult<Vec<_>>>()?;
        for (index, m) in movements.iter().enumerate() {
            if !seen.contains(&m.name) {
                tracing::warn!(
                    movement = index,
                    element = %m.name,
                    "movement targets an unknown element and will never apply"
                );
            }
        }

        let overlaps = find_overlaps(&movements);
        for w in &overlaps {
            tracing::warn!(
                element = %w.element,
                axis = ?w.axis,
                first = w.first,
                second = w.second,
                "overlapping movements drive the same axis; the later one wins"
            );
        }

        Ok(Self {
            elements,
            movements,
            overlaps,
        })
    }
}

fn resolve_element(index: usize, raw: RawElement) -> MotiongramResult<Element> {
    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| MotiongramError::validation(format!("object #{index} is missing 'name'")))?;
    let start_x = required_number(raw.start_x, &name, "startX")?;
    let start_y = required_number(raw.start_y, &name, "startY")?;
    let Some(shape) = raw.shape else {
        return Err(MotiongramError::validation(format!(
            "object '{name}' must have a 'shape' property"
        )));
    };
    let shape = resolve_shape(&name, shape)?;
    let color = raw
        .color
        .as_deref()
        .map(|c| resolve_color(c, "color"))
        .unwrap_or(Rgba8::BLACK);
    let label = resolve_label(&name, raw.label)?;

    Ok(Element {
        name,
        start_x,
        start_y,
        x: start_x,
        y: start_y,
        color,
        shape,
        label,
    })
}

fn required_number(v: Option<f64>, name: &str, field: &str) -> MotiongramResult<f64> {
    let v = v.ok_or_else(|| {
        MotiongramError::validation(format!("object '{name}' is missing '{field}'"))
    })?;
    finite(v, name, field)
}

fn finite(v: f64, name: &str, field: &str) -> MotiongramResult<f64> {
    if !v.is_finite() {
        return Err(MotiongramError::validation(format!(
            "object '{name}' {field} must be finite"
        )));
    }
    Ok(v)
}

/// Fields each premade kind may declare; anything else is dropped.
fn allowed_fields(kind: &str) -> Option<&'static [&'static str]> {
    Some(match kind {
        "rectangle" | "cloud" | "database" => &["width", "height"],
        "star" | "cat" | "dog" => &["size"],
        "line" | "line-arrow" | "arrow" => &["length", "rotation", "width"],
        _ => return None,
    })
}

fn resolve_shape(name: &str, raw: RawShape) -> MotiongramResult<Shape> {
    let outline = raw
        .outline
        .as_ref()
        .map(|o| -> MotiongramResult<Outline> {
            let thickness = finite(o.thickness.unwrap_or(1.0), name, "outline.thickness")?;
            if thickness < 0.0 {
                return Err(MotiongramError::validation(format!(
                    "object '{name}' outline.thickness must be >= 0"
                )));
            }
            Ok(Outline {
                thickness,
                color: o
                    .color
                    .as_deref()
                    .map(|c| resolve_color(c, "outline.color"))
                    .unwrap_or(Rgba8::BLACK),
            })
        })
        .transpose()?;

    let kind = match (raw.premade.as_deref(), raw.custom.as_ref()) {
        (Some(_), Some(_)) => {
            return Err(MotiongramError::validation(format!(
                "object '{name}': shape cannot have both 'premade' and 'custom' values"
            )));
        }
        (None, None) => {
            return Err(MotiongramError::validation(format!(
                "object '{name}': shape must specify either 'premade' or 'custom'"
            )));
        }
        (None, Some(custom)) => ShapeKind::Custom(resolve_custom(name, custom)?),
        (Some(premade), None) => resolve_premade(name, premade, &raw)?,
    };

    Ok(Shape { kind, outline })
}

fn resolve_premade(name: &str, premade: &str, raw: &RawShape) -> MotiongramResult<ShapeKind> {
    let unknown = || {
        MotiongramError::validation(format!(
            "object '{name}': unknown premade shape '{premade}'"
        ))
    };
    let allowed = allowed_fields(premade).ok_or_else(unknown)?;

    let declared = [
        ("width", raw.width),
        ("height", raw.height),
        ("size", raw.size),
        ("length", raw.length),
        ("rotation", raw.rotation),
    ];
    for (field, value) in declared {
        if value.is_some() && !allowed.contains(&field) {
            tracing::warn!(
                element = name,
                shape = premade,
                field,
                "field is not used by this shape and was dropped"
            );
        }
    }

    let dim = |v: Option<f64>, default: f64, field: &str| -> MotiongramResult<f64> {
        let v = finite(v.unwrap_or(default), name, field)?;
        if v < 0.0 {
            return Err(MotiongramError::validation(format!(
                "object '{name}' {field} must be >= 0"
            )));
        }
        Ok(v)
    };
    let line = || -> MotiongramResult<LineGeometry> {
        Ok(LineGeometry {
            length: dim(raw.length, 100.0, "length")?,
            rotation: finite(raw.rotation.unwrap_or(0.0), name, "rotation")?,
            width: dim(raw.width, 5.0, "width")?,
        })
    };

    Ok(match premade {
        "rectangle" => ShapeKind::Rectangle {
            width: dim(raw.width, 100.0, "width")?,
            height: dim(raw.height, 50.0, "height")?,
        },
        "cloud" => ShapeKind::Cloud {
            width: dim(raw.width, 100.0, "width")?,
            height: dim(raw.height, 50.0, "height")?,
        },
        "database" => ShapeKind::Database {
            width: dim(raw.width, 100.0, "width")?,
            height: dim(raw.height, 50.0, "height")?,
        },
        "star" => ShapeKind::Star {
            size: dim(raw.size, 50.0, "size")?,
        },
        "cat" => ShapeKind::Cat {
            size: dim(raw.size, 50.0, "size")?,
        },
        "dog" => ShapeKind::Dog {
            size: dim(raw.size, 50.0, "size")?,
        },
        "line" => ShapeKind::Line(line()?),
        "line-arrow" => ShapeKind::LineArrow(line()?),
        "arrow" => ShapeKind::Arrow(line()?),
        _ => return Err(unknown()),
    })
}

fn resolve_custom(name: &str, custom: &serde_json::Value) -> MotiongramResult<CustomShape> {
    let path = match custom {
        serde_json::Value::String(d) => Some(d.as_str()),
        serde_json::Value::Object(map) => map.get("path").and_then(|v| v.as_str()),
        _ => None,
    }
    .filter(|d| !d.trim().is_empty())
    .ok_or_else(|| {
        MotiongramError::validation(format!(
            "object '{name}': custom shape requires non-empty 'path' data"
        ))
    })?;

    let parsed = BezPath::from_svg(path).map_err(|e| {
        MotiongramError::validation(format!("object '{name}': invalid custom path: {e}"))
    })?;
    Ok(CustomShape {
        path: path.to_string(),
        parsed,
    })
}

fn resolve_label(name: &str, raw: Option<RawLabel>) -> MotiongramResult<Label> {
    let defaults = Label::default();
    let Some(raw) = raw else {
        return Ok(defaults);
    };
    Ok(Label {
        offset_x: finite(
            raw.offset_x.unwrap_or(defaults.offset_x),
            name,
            "label.offsetX",
        )?,
        offset_y: finite(
            raw.offset_y.unwrap_or(defaults.offset_y),
            name,
            "label.offsetY",
        )?,
        font: raw.font.unwrap_or(defaults.font),
        style: raw.style.unwrap_or(defaults.style),
        color: raw
            .color
            .as_deref()
            .map(|c| resolve_color(c, "label.color"))
            .unwrap_or(defaults.color),
        value: raw.value.unwrap_or(defaults.value),
    })
}

fn resolve_movement(index: usize, raw: RawMovement) -> MotiongramResult<Movement> {
    let missing = |field: &str| {
        MotiongramError::validation(format!("movement #{index} is missing '{field}'"))
    };
    let m = Movement {
        name: raw.name.ok_or_else(|| missing("name"))?,
        time_start: raw.time_start.ok_or_else(|| missing("timeStart"))?,
        time_end: raw.time_end.ok_or_else(|| missing("timeEnd"))?,
        start_x: raw.start_x,
        start_y: raw.start_y,
        end_x: raw.end_x,
        end_y: raw.end_y,
        // Checked when the movement first moves an axis, like an unknown name.
        strategy: raw.strategy.unwrap_or_default(),
    };
    validate_movement(index, &m)?;
    Ok(m)
}

fn validate_movement(index: usize, m: &Movement) -> MotiongramResult<()> {
    let fields = [
        ("timeStart", Some(m.time_start)),
        ("timeEnd", Some(m.time_end)),
        ("startX", m.start_x),
        ("startY", m.start_y),
        ("endX", m.end_x),
        ("endY", m.end_y),
    ];
    for (field, value) in fields {
        if let Some(v) = value
            && !v.is_finite()
        {
            return Err(MotiongramError::validation(format!(
                "movement #{index} ('{}') {field} must be finite",
                m.name
            )));
        }
    }
    if m.time_end <= m.time_start {
        return Err(MotiongramError::validation(format!(
            "movement #{index} ('{}') timeEnd must be greater than timeStart",
            m.name
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/document/load.rs"]
mod tests;
