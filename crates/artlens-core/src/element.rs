use serde_json::Value;

use crate::color::{parse_color, Rgba};

/// The resolved kind of a scene-graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Line,
    Text,
    Image,
    Group,
}

/// Ordered dispatch rules for the free-text `type` field. The first rule
/// whose substring appears in the lowercased type wins, so a type such as
/// "rectangle-group" resolves to Rectangle, never Group.
const KIND_RULES: &[(&str, ElementKind)] = &[
    ("rectangle", ElementKind::Rectangle),
    ("rect", ElementKind::Rectangle),
    ("circle", ElementKind::Ellipse),
    ("ellipse", ElementKind::Ellipse),
    ("line", ElementKind::Line),
    ("path", ElementKind::Line),
    ("text", ElementKind::Text),
    ("string", ElementKind::Text),
    ("image", ElementKind::Image),
    ("bitmap", ElementKind::Image),
    ("picture", ElementKind::Image),
    ("group", ElementKind::Group),
    ("container", ElementKind::Group),
];

/// Resolve a free-text type field to an [`ElementKind`], or `None` if no
/// rule matches (such nodes are skipped by the renderer).
pub fn resolve_kind(type_field: &str) -> Option<ElementKind> {
    let lower = type_field.to_lowercase();
    KIND_RULES
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, kind)| *kind)
}

/// A parsed scene-graph node. All historical key aliases (`x`/`left`,
/// `fill`/`color`, ...) are resolved here once, at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Parsed for completeness; rendering does not apply rotation.
    pub rotation: f64,
    pub opacity: f64,
    pub shape: Shape,
}

/// Kind-specific node payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rectangle(FillStroke),
    Ellipse(FillStroke),
    Line(LineShape),
    Text(TextShape),
    Image(ImageShape),
    Group(GroupShape),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillStroke {
    pub fill: Option<Rgba>,
    pub stroke: Option<Rgba>,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub stroke: Option<Rgba>,
    pub stroke_width: f64,
    /// Polyline points from `path`/`d`, local to the node origin.
    pub points: Vec<(f64, f64)>,
    /// Explicit end point for the single-segment form.
    pub x2: Option<f64>,
    pub y2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextShape {
    pub content: String,
    pub color: Option<Rgba>,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageShape {
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupShape {
    pub children: Vec<Element>,
}

impl Element {
    /// Parse a raw JSON element record. Returns `None` for non-object values
    /// and for types no dispatch rule matches; such nodes are silently
    /// dropped from the scene.
    pub fn from_value(value: &Value) -> Option<Element> {
        let obj = value.as_object()?;
        let type_field = obj.get("type").and_then(Value::as_str).unwrap_or("");
        let kind = resolve_kind(type_field)?;

        let shape = match kind {
            ElementKind::Rectangle => Shape::Rectangle(parse_fill_stroke(value)),
            ElementKind::Ellipse => Shape::Ellipse(parse_fill_stroke(value)),
            ElementKind::Line => Shape::Line(parse_line(value)),
            ElementKind::Text => Shape::Text(parse_text(value)?),
            ElementKind::Image => Shape::Image(parse_image(value)?),
            ElementKind::Group => Shape::Group(GroupShape {
                children: parse_children(value),
            }),
        };

        Some(Element {
            x: field(value, &["x", "left"], 0.0),
            y: field(value, &["y", "top"], 0.0),
            width: field(value, &["width", "w"], 0.0),
            height: field(value, &["height", "h"], 0.0),
            rotation: field(value, &["rotation", "r"], 0.0),
            opacity: field(value, &["opacity", "alpha"], 1.0),
            shape,
        })
    }
}

/// Parse the child list of a group or artboard: the first present key of
/// `children`/`elements`/`content` wins; a non-array value yields no
/// children.
pub fn parse_children(value: &Value) -> Vec<Element> {
    let Some(items) = child_list(value) else {
        return Vec::new();
    };
    items.iter().filter_map(Element::from_value).collect()
}

pub(crate) fn child_list(value: &Value) -> Option<&Vec<Value>> {
    let obj = value.as_object()?;
    let list = obj
        .get("children")
        .or_else(|| obj.get("elements"))
        .or_else(|| obj.get("content"))?;
    list.as_array()
}

/// First present numeric field among `keys`, else the default. A present
/// but non-numeric value also degrades to the default.
pub(crate) fn field(value: &Value, keys: &[&str], default: f64) -> f64 {
    keys.iter()
        .find_map(|k| value.get(k))
        .and_then(Value::as_f64)
        .unwrap_or(default)
}

fn field_opt(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

/// Color from the first present alias, defaulting to opaque black when all
/// aliases are missing. An explicit `null` disables the color entirely.
pub(crate) fn color_or_black(value: &Value, keys: &[&str]) -> Option<Rgba> {
    match keys.iter().find_map(|k| value.get(k)) {
        Some(v) => parse_color(v),
        None => Some(Rgba::BLACK),
    }
}

fn parse_fill_stroke(value: &Value) -> FillStroke {
    FillStroke {
        fill: color_or_black(value, &["fill", "color"]),
        stroke: value
            .get("stroke")
            .or_else(|| value.get("borderColor"))
            .and_then(parse_color),
        stroke_width: field(value, &["strokeWidth", "borderWidth"], 0.0),
    }
}

fn parse_line(value: &Value) -> LineShape {
    let points = value
        .get("path")
        .or_else(|| value.get("d"))
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(parse_point).collect())
        .unwrap_or_default();

    LineShape {
        stroke: color_or_black(value, &["stroke", "color"]),
        // For lines the geometric `width` doubles as the historical stroke
        // width alias.
        stroke_width: field(value, &["strokeWidth", "width"], 1.0),
        points,
        x2: field_opt(value, "x2"),
        y2: field_opt(value, "y2"),
    }
}

/// A path entry is either an `{x, y}` object or an `[x, y]` array; anything
/// else degrades to the node origin.
fn parse_point(entry: &Value) -> (f64, f64) {
    match entry {
        Value::Object(_) => (field(entry, &["x"], 0.0), field(entry, &["y"], 0.0)),
        Value::Array(items) => (
            items.first().and_then(Value::as_f64).unwrap_or(0.0),
            items.get(1).and_then(Value::as_f64).unwrap_or(0.0),
        ),
        _ => (0.0, 0.0),
    }
}

fn parse_text(value: &Value) -> Option<TextShape> {
    let content = ["text", "content", "string"]
        .iter()
        .find_map(|k| value.get(k))
        .and_then(text_value)?;
    if content.is_empty() {
        return None;
    }
    Some(TextShape {
        content,
        color: color_or_black(value, &["fill", "color"]),
        font_size: field(value, &["fontSize", "size"], 12.0),
    })
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_image(value: &Value) -> Option<ImageShape> {
    let reference = ["href", "src", "path", "file"]
        .iter()
        .find_map(|k| value.get(k))
        .and_then(Value::as_str)
        .unwrap_or("");
    if reference.is_empty() {
        log::debug!("image element without a usable reference, skipping");
        return None;
    }
    Some(ImageShape {
        reference: reference.to_string(),
    })
}
