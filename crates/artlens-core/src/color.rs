use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Normalize a JSON color value into [`Rgba`].
///
/// Accepted forms: `#RRGGBB` / `#RRGGBBAA` hex strings, objects with
/// `r|red`, `g|green`, `b|blue`, `a|alpha` channels, and numeric arrays of
/// length 3 or 4. Float channels are 0..1 and scaled by 255; integral
/// channels are used as-is. JSON `null` yields `None`; any other malformed
/// value degrades to opaque black.
pub fn parse_color(value: &Value) -> Option<Rgba> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(parse_color_string(s)),
        Value::Object(obj) => {
            let r = channel(obj.get("r").or_else(|| obj.get("red")), 0);
            let g = channel(obj.get("g").or_else(|| obj.get("green")), 0);
            let b = channel(obj.get("b").or_else(|| obj.get("blue")), 0);
            let a = channel(obj.get("a").or_else(|| obj.get("alpha")), 255);
            Some(Rgba::new(r, g, b, a))
        }
        Value::Array(items) if items.len() >= 3 => {
            let r = channel(items.get(0), 0);
            let g = channel(items.get(1), 0);
            let b = channel(items.get(2), 0);
            let a = channel(items.get(3), 255);
            Some(Rgba::new(r, g, b, a))
        }
        _ => Some(Rgba::BLACK),
    }
}

fn parse_color_string(s: &str) -> Rgba {
    if let Some(hex) = s.strip_prefix('#') {
        match hex.len() {
            6 => {
                if let (Some(r), Some(g), Some(b)) =
                    (hex_byte(&hex[0..2]), hex_byte(&hex[2..4]), hex_byte(&hex[4..6]))
                {
                    return Rgba::new(r, g, b, 255);
                }
            }
            8 => {
                if let (Some(r), Some(g), Some(b), Some(a)) = (
                    hex_byte(&hex[0..2]),
                    hex_byte(&hex[2..4]),
                    hex_byte(&hex[4..6]),
                    hex_byte(&hex[6..8]),
                ) {
                    return Rgba::new(r, g, b, a);
                }
            }
            _ => {}
        }
    }
    // Functional notations (rgb(...), hsl(...)) and anything else are out of
    // scope for this parser.
    Rgba::BLACK
}

fn hex_byte(pair: &str) -> Option<u8> {
    u8::from_str_radix(pair, 16).ok()
}

/// Read one channel. Float values are 0..1 scaled by 255 and truncated;
/// integral values are clamped into 0..255. Missing or non-numeric values
/// take the default.
fn channel(value: Option<&Value>, default: u8) -> u8 {
    let Some(Value::Number(n)) = value else {
        return default;
    };
    if let Some(i) = n.as_i64() {
        i.clamp(0, 255) as u8
    } else {
        let scaled = (n.as_f64().unwrap_or(0.0) * 255.0) as i64;
        scaled.clamp(0, 255) as u8
    }
}

/// Scale a color's alpha channel by an element opacity in 0..1, truncating
/// toward zero. RGB channels are untouched.
pub fn apply_opacity(color: Rgba, opacity: f64) -> Rgba {
    Rgba {
        a: (color.a as f64 * opacity) as u8,
        ..color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hex_rgb_exact() {
        assert_eq!(
            parse_color(&json!("#FF8040")),
            Some(Rgba::new(255, 128, 64, 255))
        );
        assert_eq!(
            parse_color(&json!("#00000000")),
            Some(Rgba::new(0, 0, 0, 0))
        );
        assert_eq!(
            parse_color(&json!("#11223380")),
            Some(Rgba::new(0x11, 0x22, 0x33, 0x80))
        );
    }

    #[test]
    fn test_null_is_none() {
        assert_eq!(parse_color(&Value::Null), None);
    }

    #[test]
    fn test_malformed_falls_back_to_black() {
        assert_eq!(parse_color(&json!("rgb(1,2,3)")), Some(Rgba::BLACK));
        assert_eq!(parse_color(&json!("#12")), Some(Rgba::BLACK));
        assert_eq!(parse_color(&json!("#GGHHII")), Some(Rgba::BLACK));
        assert_eq!(parse_color(&json!(true)), Some(Rgba::BLACK));
        assert_eq!(parse_color(&json!([1, 2])), Some(Rgba::BLACK));
    }

    #[test]
    fn test_object_float_vs_int_channels() {
        // Floats scale by 255 and truncate; integers pass through.
        assert_eq!(
            parse_color(&json!({"r": 1.0, "g": 0.5, "b": 0})),
            Some(Rgba::new(255, 127, 0, 255))
        );
        assert_eq!(
            parse_color(&json!({"red": 10, "green": 20, "blue": 30, "alpha": 0.5})),
            Some(Rgba::new(10, 20, 30, 127))
        );
        assert_eq!(
            parse_color(&json!({"r": 300, "g": -5, "b": 0})),
            Some(Rgba::new(255, 0, 0, 255))
        );
    }

    #[test]
    fn test_array_channels() {
        assert_eq!(
            parse_color(&json!([255, 0, 0])),
            Some(Rgba::new(255, 0, 0, 255))
        );
        assert_eq!(
            parse_color(&json!([0.0, 1.0, 0.0, 0.25])),
            Some(Rgba::new(0, 255, 0, 63))
        );
    }

    #[test]
    fn test_apply_opacity_identity_and_zero() {
        let c = Rgba::new(10, 20, 30, 200);
        assert_eq!(apply_opacity(c, 1.0), c);
        assert_eq!(apply_opacity(c, 0.0), Rgba::new(10, 20, 30, 0));
        assert_eq!(apply_opacity(c, 0.5), Rgba::new(10, 20, 30, 100));
    }
}
