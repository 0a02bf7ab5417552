use serde_json::Value;

use crate::color::{parse_color, Rgba};
use crate::element::{self, Element};

/// A parsed artboard document: the root scene of one render call.
///
/// Artboards are constructed fresh from JSON per render and never mutated,
/// so repeated renders of the same document are independent.
#[derive(Debug, Clone, PartialEq)]
pub struct Artboard {
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Canvas fill painted over the white base; `None` when an explicit
    /// JSON `null` disabled it.
    pub background: Option<Rgba>,
    pub children: Vec<Element>,
}

impl Artboard {
    /// Parse a root artboard document. Tolerant: a non-object value yields
    /// an empty artboard that renders at the default size.
    pub fn from_value(value: &Value) -> Artboard {
        let background = match value
            .get("backgroundColor")
            .or_else(|| value.get("bgColor"))
        {
            Some(v) => parse_color(v),
            None => Some(Rgba::WHITE),
        };

        Artboard {
            width: dimension(value, &["width", "w"]),
            height: dimension(value, &["height", "h"]),
            background,
            children: element::parse_children(value),
        }
    }
}

fn dimension(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|k| value.get(k))
        .and_then(Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_artboard_parse() {
        let board = Artboard::from_value(&json!({
            "w": 320,
            "height": 200,
            "bgColor": "#102030",
            "elements": [{"type": "rect"}, {"type": "unknown"}]
        }));
        assert_eq!(board.width, Some(320.0));
        assert_eq!(board.height, Some(200.0));
        assert_eq!(board.background, Some(Rgba::new(0x10, 0x20, 0x30, 255)));
        assert_eq!(board.children.len(), 1);
    }

    #[test]
    fn test_artboard_defaults() {
        let board = Artboard::from_value(&json!({}));
        assert_eq!(board.width, None);
        assert_eq!(board.background, Some(Rgba::WHITE));
        assert!(board.children.is_empty());

        let board = Artboard::from_value(&json!("garbage"));
        assert!(board.children.is_empty());
    }
}
