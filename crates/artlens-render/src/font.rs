//! Font loading and glyph rasterization.
//!
//! Text is drawn with a cascade resolved once per renderer: a DejaVu Sans
//! system face, then Liberation Sans, then an embedded fixed-size 5x7
//! bitmap face. Scalable faces are rasterized by flattening TrueType
//! outlines into polylines and filling scanlines with the nonzero winding
//! rule; there is no antialiasing, kerning, or shaping.

use image::RgbaImage;
use ttf_parser::{Face, GlyphId, OutlineBuilder};

use artlens_core::Rgba;

use crate::canvas;

const SYSTEM_FACE_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

/// The face a renderer draws text with.
#[derive(Debug)]
pub enum DefaultFont {
    Scalable(ScalableFace),
    Bitmap,
}

/// Walk the system face cascade and return the first face that parses,
/// degrading to the bitmap fallback when none does.
pub fn load_default_font() -> DefaultFont {
    for path in SYSTEM_FACE_PATHS {
        let Ok(data) = std::fs::read(path) else {
            continue;
        };
        match ScalableFace::from_data(data) {
            Ok(face) => {
                log::debug!("text face: {path}");
                return DefaultFont::Scalable(face);
            }
            Err(err) => log::debug!("unusable face {path}: {err}"),
        }
    }
    log::debug!("no scalable system face found, using bitmap fallback");
    DefaultFont::Bitmap
}

impl DefaultFont {
    /// Draw a single line of text with its top-left corner at `(x, y)`.
    /// The requested size applies to scalable faces; the bitmap face is
    /// fixed-size.
    pub fn draw_line(&self, img: &mut RgbaImage, x: f64, y: f64, line: &str, size: f64, color: Rgba) {
        match self {
            DefaultFont::Scalable(face) => face.draw_line(img, x, y, line, size, color),
            DefaultFont::Bitmap => draw_bitmap_line(img, x, y, line, color),
        }
    }
}

/// An owned TrueType face, validated at construction.
pub struct ScalableFace {
    data: Vec<u8>,
}

impl std::fmt::Debug for ScalableFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalableFace")
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl ScalableFace {
    pub fn from_data(data: Vec<u8>) -> Result<Self, String> {
        Face::parse(&data, 0).map_err(|e| format!("failed to parse font: {e:?}"))?;
        Ok(Self { data })
    }

    fn draw_line(&self, img: &mut RgbaImage, x: f64, y: f64, line: &str, size: f64, color: Rgba) {
        // Parsing borrows the byte slice and is cheap enough per draw call.
        let Ok(face) = Face::parse(&self.data, 0) else {
            return;
        };
        let units_per_em = face.units_per_em() as f64;
        if units_per_em <= 0.0 {
            return;
        }
        let scale = size / units_per_em;
        let baseline = y + face.ascender() as f64 * scale;

        let mut pen_x = x;
        for ch in line.chars() {
            let Some(glyph) = face.glyph_index(ch) else {
                pen_x += size * 0.5;
                continue;
            };
            let mut sink = OutlineSink::new(scale, pen_x, baseline);
            if face.outline_glyph(glyph, &mut sink).is_some() {
                sink.finish();
                fill_contours(img, &sink.contours, color);
            }
            pen_x += advance(&face, glyph, scale, size);
        }
    }
}

fn advance(face: &Face<'_>, glyph: GlyphId, scale: f64, size: f64) -> f64 {
    face.glyph_hor_advance(glyph)
        .map(|adv| adv as f64 * scale)
        .unwrap_or(size * 0.5)
}

/// Collects a glyph outline as flattened polyline contours in canvas
/// coordinates (y-down, translated to the pen position).
struct OutlineSink {
    scale: f64,
    dx: f64,
    baseline: f64,
    contours: Vec<Vec<(f64, f64)>>,
    current: Vec<(f64, f64)>,
}

impl OutlineSink {
    fn new(scale: f64, dx: f64, baseline: f64) -> Self {
        Self {
            scale,
            dx,
            baseline,
            contours: Vec::new(),
            current: Vec::new(),
        }
    }

    fn map(&self, x: f32, y: f32) -> (f64, f64) {
        (
            self.dx + x as f64 * self.scale,
            self.baseline - y as f64 * self.scale,
        )
    }

    fn flush(&mut self) {
        if self.current.len() >= 3 {
            self.contours.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }

    fn finish(&mut self) {
        self.flush();
    }
}

impl OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        let p = self.map(x, y);
        self.current.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.current.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let Some(&(sx, sy)) = self.current.last() else {
            return;
        };
        let (cx, cy) = self.map(x1, y1);
        let (ex, ey) = self.map(x, y);
        const STEPS: usize = 8;
        for i in 1..=STEPS {
            let t = i as f64 / STEPS as f64;
            let u = 1.0 - t;
            let px = u * u * sx + 2.0 * u * t * cx + t * t * ex;
            let py = u * u * sy + 2.0 * u * t * cy + t * t * ey;
            self.current.push((px, py));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let Some(&(sx, sy)) = self.current.last() else {
            return;
        };
        let (c1x, c1y) = self.map(x1, y1);
        let (c2x, c2y) = self.map(x2, y2);
        let (ex, ey) = self.map(x, y);
        const STEPS: usize = 12;
        for i in 1..=STEPS {
            let t = i as f64 / STEPS as f64;
            let u = 1.0 - t;
            let px = u * u * u * sx + 3.0 * u * u * t * c1x + 3.0 * u * t * t * c2x + t * t * t * ex;
            let py = u * u * u * sy + 3.0 * u * u * t * c1y + 3.0 * u * t * t * c2y + t * t * t * ey;
            self.current.push((px, py));
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}

/// Fill closed contours with the nonzero winding rule, one scanline at a
/// time through pixel centers.
fn fill_contours(img: &mut RgbaImage, contours: &[Vec<(f64, f64)>], color: Rgba) {
    if contours.is_empty() {
        return;
    }
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;
    for p in contours.iter().flatten() {
        min_y = min_y.min(p.1);
        max_y = max_y.max(p.1);
    }

    let (_, img_h) = img.dimensions();
    let y_start = (min_y.floor() as i64).max(0);
    let y_end = (max_y.ceil() as i64).min(img_h as i64 - 1);

    let mut crossings: Vec<(f64, i32)> = Vec::new();
    for py in y_start..=y_end {
        let sy = py as f64 + 0.5;
        crossings.clear();
        for contour in contours {
            let n = contour.len();
            for i in 0..n {
                let (px0, py0) = contour[i];
                let (px1, py1) = contour[(i + 1) % n];
                let crosses = (py0 <= sy && py1 > sy) || (py1 <= sy && py0 > sy);
                if !crosses {
                    continue;
                }
                let t = (sy - py0) / (py1 - py0);
                let x = px0 + t * (px1 - px0);
                let dir = if py1 > py0 { 1 } else { -1 };
                crossings.push((x, dir));
            }
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        let mut span_start = 0.0;
        for &(x, dir) in crossings.iter() {
            let was_inside = winding != 0;
            winding += dir;
            if !was_inside && winding != 0 {
                span_start = x;
            } else if was_inside && winding == 0 {
                fill_span(img, span_start, x, py, color);
            }
        }
    }
}

fn fill_span(img: &mut RgbaImage, x0: f64, x1: f64, y: i64, color: Rgba) {
    if y < 0 {
        return;
    }
    let (img_w, img_h) = img.dimensions();
    if y >= img_h as i64 {
        return;
    }
    let start = (x0.round() as i64).max(0);
    let end = (x1.round() as i64).min(img_w as i64);
    for px in start..end {
        img.put_pixel(px as u32, y as u32, image::Rgba([color.r, color.g, color.b, color.a]));
    }
}

// ── Bitmap fallback face ─────────────────────────────────────────────

const BITMAP_GLYPH_WIDTH: i64 = 5;
const BITMAP_GLYPH_HEIGHT: i64 = 7;
const BITMAP_ADVANCE: i64 = 6;

fn draw_bitmap_line(img: &mut RgbaImage, x: f64, y: f64, line: &str, color: Rgba) {
    let mut pen_x = x.round() as i64;
    let top = y.round() as i64;
    for ch in line.chars() {
        if let Some(glyph) = bitmap_glyph(ch) {
            for (col, bits) in glyph.iter().enumerate() {
                for row in 0..BITMAP_GLYPH_HEIGHT {
                    if bits & (1 << row) != 0 {
                        canvas::fill_rect(
                            img,
                            (pen_x + col as i64) as f64,
                            (top + row) as f64,
                            (pen_x + col as i64) as f64,
                            (top + row) as f64,
                            color,
                        );
                    }
                }
            }
        }
        pen_x += BITMAP_ADVANCE;
    }
}

/// Column-major 5x7 glyph, least-significant bit at the top row.
/// Covers printable ASCII; anything else renders as a blank advance.
fn bitmap_glyph(ch: char) -> Option<[u8; BITMAP_GLYPH_WIDTH as usize]> {
    let idx = (ch as u32).checked_sub(0x20)? as usize;
    GLYPHS_5X7.get(idx).copied()
}

#[rustfmt::skip]
const GLYPHS_5X7: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x14, 0x08, 0x3E, 0x08, 0x14], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x08, 0x04, 0x08, 0x10, 0x08], // ~
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_line_marks_pixels() {
        let mut img = RgbaImage::from_pixel(40, 12, image::Rgba([255, 255, 255, 255]));
        draw_bitmap_line(&mut img, 1.0, 2.0, "Hi", Rgba::BLACK);
        let dark = img.pixels().filter(|p| p.0 == [0, 0, 0, 255]).count();
        assert!(dark > 0);
    }

    #[test]
    fn test_bitmap_unknown_glyph_is_blank() {
        let mut img = RgbaImage::from_pixel(20, 12, image::Rgba([255, 255, 255, 255]));
        draw_bitmap_line(&mut img, 0.0, 0.0, "\u{00e9}", Rgba::BLACK);
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_fill_contours_square() {
        let mut img = RgbaImage::from_pixel(10, 10, image::Rgba([255, 255, 255, 255]));
        let square = vec![vec![(2.0, 2.0), (8.0, 2.0), (8.0, 8.0), (2.0, 8.0)]];
        fill_contours(&mut img, &square, Rgba::BLACK);
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }
}
