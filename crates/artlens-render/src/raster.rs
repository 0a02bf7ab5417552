//! The scene-graph walker: renders a parsed artboard onto an RGBA canvas.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde_json::Value;

use artlens_core::element::{Element, FillStroke, ImageShape, LineShape, Shape, TextShape};
use artlens_core::{apply_opacity, Artboard, Rgba};

use crate::assets;
use crate::canvas;
use crate::font::{self, DefaultFont};

const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;

/// Renders artboard documents against a base directory that anchors their
/// image references. The text face cascade is resolved once per renderer.
#[derive(Debug)]
pub struct ArtboardRenderer {
    base_directory: PathBuf,
    default_font: DefaultFont,
}

impl ArtboardRenderer {
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
            default_font: font::load_default_font(),
        }
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Render a full artboard document. Explicit dimensions override the
    /// document's `width|w`/`height|h` fields; both fall back to 800x600.
    ///
    /// Malformed element records degrade to defaults or are skipped; a
    /// render never fails.
    pub fn render_artboard(
        &self,
        artboard_data: &Value,
        width: Option<u32>,
        height: Option<u32>,
    ) -> RgbaImage {
        let artboard = Artboard::from_value(artboard_data);

        let w = width
            .or_else(|| artboard.width.map(|v| v as u32))
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_WIDTH);
        let h = height
            .or_else(|| artboard.height.map(|v| v as u32))
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_HEIGHT);

        let mut img = RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
        if let Some(bg) = artboard.background {
            canvas::fill_rect(&mut img, 0.0, 0.0, w as f64, h as f64, bg);
        }

        // Listed order is paint order: later elements draw over earlier ones.
        for element in &artboard.children {
            self.render_element(&mut img, element, 0.0, 0.0);
        }

        img
    }

    /// Render one element at its position offset by the accumulated group
    /// origin `(dx, dy)`.
    fn render_element(&self, img: &mut RgbaImage, element: &Element, dx: f64, dy: f64) {
        let x = element.x + dx;
        let y = element.y + dy;

        match &element.shape {
            Shape::Rectangle(fs) => self.render_rectangle(img, x, y, element, fs),
            Shape::Ellipse(fs) => self.render_ellipse(img, x, y, element, fs),
            Shape::Line(line) => render_line(img, x, y, element, line),
            Shape::Text(text) => self.render_text(img, x, y, element, text),
            Shape::Image(image_ref) => self.render_image(img, x, y, element, image_ref),
            Shape::Group(group) => {
                // Child coordinates are relative to the group; the offset
                // accumulates additively through nesting.
                for child in &group.children {
                    self.render_element(img, child, x, y);
                }
            }
        }
    }

    fn render_rectangle(&self, img: &mut RgbaImage, x: f64, y: f64, element: &Element, fs: &FillStroke) {
        if let Some(fill) = fs.fill {
            let fill = apply_opacity(fill, element.opacity);
            canvas::fill_rect(img, x, y, x + element.width, y + element.height, fill);
        }
        if let Some(stroke) = fs.stroke {
            let passes = fs.stroke_width as i64;
            if passes > 0 {
                let stroke = apply_opacity(stroke, element.opacity);
                // Nested concentric outlines approximate a thick border.
                for i in 0..passes {
                    let inset = i as f64;
                    canvas::outline_rect(
                        img,
                        x + inset,
                        y + inset,
                        x + element.width - inset,
                        y + element.height - inset,
                        stroke,
                    );
                }
            }
        }
    }

    fn render_ellipse(&self, img: &mut RgbaImage, x: f64, y: f64, element: &Element, fs: &FillStroke) {
        let (x1, y1) = (x + element.width, y + element.height);
        if let Some(fill) = fs.fill {
            canvas::fill_ellipse(img, x, y, x1, y1, apply_opacity(fill, element.opacity));
        }
        if let Some(stroke) = fs.stroke {
            let width = fs.stroke_width as u32;
            if width > 0 {
                canvas::stroke_ellipse(img, x, y, x1, y1, apply_opacity(stroke, element.opacity), width);
            }
        }
    }

    fn render_text(&self, img: &mut RgbaImage, x: f64, y: f64, element: &Element, text: &TextShape) {
        let Some(color) = text.color else {
            return;
        };
        let color = apply_opacity(color, element.opacity);

        let mut running_y = y;
        for line in text.content.split('\n') {
            self.default_font
                .draw_line(img, x, running_y, line, text.font_size, color);
            // Approximate line height; no real ascent/descent metrics.
            running_y += text.font_size * 1.2;
        }
    }

    fn render_image(&self, img: &mut RgbaImage, x: f64, y: f64, element: &Element, image_ref: &ImageShape) {
        let Some(path) = assets::resolve_reference(&self.base_directory, &image_ref.reference)
        else {
            log::debug!("image reference not found: {}", image_ref.reference);
            return;
        };

        let decoded = match image::open(&path) {
            Ok(decoded) => decoded,
            Err(err) => {
                // A broken asset omits the element, never aborts the render.
                log::debug!("failed to decode {}: {err}", path.display());
                return;
            }
        };
        let mut overlay_img = decoded.to_rgba8();

        if element.width > 0.0 && element.height > 0.0 {
            overlay_img = imageops::resize(
                &overlay_img,
                element.width as u32,
                element.height as u32,
                FilterType::Lanczos3,
            );
        }

        if element.opacity < 1.0 {
            for pixel in overlay_img.pixels_mut() {
                pixel.0[3] = (pixel.0[3] as f64 * element.opacity) as u8;
            }
        }

        imageops::overlay(img, &overlay_img, x as i64, y as i64);
    }
}

fn render_line(img: &mut RgbaImage, x: f64, y: f64, element: &Element, line: &LineShape) {
    let Some(stroke) = line.stroke else {
        return;
    };
    let stroke = apply_opacity(stroke, element.opacity);
    let width = line.stroke_width as u32;

    if line.points.len() >= 2 {
        let translated: Vec<(f64, f64)> = line
            .points
            .iter()
            .map(|(px, py)| (px + x, py + y))
            .collect();
        canvas::draw_polyline(img, &translated, stroke, width);
    } else {
        let end_x = line.x2.unwrap_or(x + element.width);
        let end_y = line.y2.unwrap_or(y + element.height);
        canvas::draw_segment(img, x, y, end_x, end_y, stroke, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn px(img: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
        img.get_pixel(x, y).0
    }

    #[test]
    fn test_red_rect_on_small_canvas() {
        let renderer = ArtboardRenderer::new("/nonexistent");
        let doc = json!({
            "width": 100, "height": 50,
            "children": [
                {"type": "rectangle", "x": 10, "y": 10, "width": 20, "height": 20, "fill": "#FF0000"}
            ]
        });
        let img = renderer.render_artboard(&doc, None, None);
        assert_eq!(img.dimensions(), (100, 50));
        assert_eq!(px(&img, 15, 15), [255, 0, 0, 255]);
        assert_eq!(px(&img, 5, 5), [255, 255, 255, 255]);
        assert_eq!(px(&img, 45, 45), [255, 255, 255, 255]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = ArtboardRenderer::new("/nonexistent");
        let doc = json!({
            "width": 64, "height": 64,
            "bgColor": "#123456",
            "children": [
                {"type": "ellipse", "x": 4, "y": 4, "width": 40, "height": 30, "fill": [0.5, 0.25, 1.0]},
                {"type": "line", "x": 0, "y": 0, "x2": 60, "y2": 60, "strokeWidth": 2},
                {"type": "text", "x": 2, "y": 40, "text": "ab", "fill": "#000000"}
            ]
        });
        let first = renderer.render_artboard(&doc, None, None);
        let second = renderer.render_artboard(&doc, None, None);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_nested_group_offsets_accumulate() {
        let renderer = ArtboardRenderer::new("/nonexistent");
        // Groups at (10,10), (5,5), (0,20); child at local (1,1) lands at
        // (16,36).
        let doc = json!({
            "width": 60, "height": 60,
            "children": [{
                "type": "group", "x": 10, "y": 10,
                "children": [{
                    "type": "group", "x": 5, "y": 5,
                    "children": [{
                        "type": "group", "x": 0, "y": 20,
                        "children": [{
                            "type": "rect", "x": 1, "y": 1,
                            "width": 1, "height": 1, "fill": "#00FF00"
                        }]
                    }]
                }]
            }]
        });
        let img = renderer.render_artboard(&doc, None, None);
        assert_eq!(px(&img, 16, 36), [0, 255, 0, 255]);
        assert_eq!(px(&img, 1, 1), [255, 255, 255, 255]);
        assert_eq!(px(&img, 15, 35), [255, 255, 255, 255]);
    }

    #[test]
    fn test_explicit_size_overrides_document() {
        let renderer = ArtboardRenderer::new("/nonexistent");
        let doc = json!({"width": 100, "height": 100});
        let img = renderer.render_artboard(&doc, Some(30), Some(20));
        assert_eq!(img.dimensions(), (30, 20));

        let img = renderer.render_artboard(&json!({}), None, None);
        assert_eq!(img.dimensions(), (800, 600));
    }

    #[test]
    fn test_missing_image_reference_is_omitted() {
        let renderer = ArtboardRenderer::new("/nonexistent");
        let doc = json!({
            "width": 20, "height": 20,
            "children": [
                {"type": "image", "href": "gone.png", "x": 0, "y": 0, "width": 10, "height": 10}
            ]
        });
        let img = renderer.render_artboard(&doc, None, None);
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_image_element_composites_asset() {
        let dir = tempfile::tempdir().unwrap();
        let asset = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 255, 255]));
        asset.save(dir.path().join("chip.png")).unwrap();

        let renderer = ArtboardRenderer::new(dir.path());
        let doc = json!({
            "width": 16, "height": 16,
            "children": [
                {"type": "image", "src": "chip.png", "x": 4, "y": 4, "width": 8, "height": 8}
            ]
        });
        let img = renderer.render_artboard(&doc, None, None);
        assert_eq!(px(&img, 8, 8), [0, 0, 255, 255]);
        assert_eq!(px(&img, 1, 1), [255, 255, 255, 255]);
    }

    #[test]
    fn test_stroke_only_rectangle() {
        let renderer = ArtboardRenderer::new("/nonexistent");
        let doc = json!({
            "width": 30, "height": 30,
            "children": [{
                "type": "rect", "x": 5, "y": 5, "width": 20, "height": 20,
                "fill": null, "stroke": "#0000FF", "strokeWidth": 2
            }]
        });
        let img = renderer.render_artboard(&doc, None, None);
        // Two concentric outline passes.
        assert_eq!(px(&img, 5, 5), [0, 0, 255, 255]);
        assert_eq!(px(&img, 6, 6), [0, 0, 255, 255]);
        assert_eq!(px(&img, 7, 7), [255, 255, 255, 255]);
        assert_eq!(px(&img, 15, 15), [255, 255, 255, 255]);
    }
}
