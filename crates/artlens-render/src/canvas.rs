//! Low-level drawing primitives over an RGBA canvas.
//!
//! All primitives use overwrite semantics: covered pixels take the given
//! RGBA value verbatim, including alpha. Shapes never blend with what is
//! already on the canvas; only embedded images composite (see the walker).
//! Every primitive clips to the canvas bounds.

use image::RgbaImage;

use artlens_core::Rgba;

fn put(img: &mut RgbaImage, x: i64, y: i64, color: Rgba) {
    if x < 0 || y < 0 {
        return;
    }
    let (w, h) = img.dimensions();
    if x >= w as i64 || y >= h as i64 {
        return;
    }
    img.put_pixel(x as u32, y as u32, image::Rgba([color.r, color.g, color.b, color.a]));
}

/// Fill the axis-aligned rectangle spanning `(x0, y0)..=(x1, y1)`, corners
/// inclusive. Corner order is normalized first.
pub fn fill_rect(img: &mut RgbaImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba) {
    let (x0, x1) = (x0.min(x1), x0.max(x1));
    let (y0, y1) = (y0.min(y1), y0.max(y1));
    let (w, h) = img.dimensions();

    let px0 = (x0.floor() as i64).max(0);
    let py0 = (y0.floor() as i64).max(0);
    let px1 = (x1.floor() as i64).min(w as i64 - 1);
    let py1 = (y1.floor() as i64).min(h as i64 - 1);

    for py in py0..=py1 {
        for px in px0..=px1 {
            put(img, px, py, color);
        }
    }
}

/// Draw the 1-px outline of the rectangle spanning `(x0, y0)..=(x1, y1)`.
pub fn outline_rect(img: &mut RgbaImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba) {
    let (x0, x1) = ((x0.min(x1)).floor() as i64, (x0.max(x1)).floor() as i64);
    let (y0, y1) = ((y0.min(y1)).floor() as i64, (y0.max(y1)).floor() as i64);
    let (w, h) = img.dimensions();

    for px in x0.max(0)..=x1.min(w as i64 - 1) {
        put(img, px, y0, color);
        put(img, px, y1, color);
    }
    for py in y0.max(0)..=y1.min(h as i64 - 1) {
        put(img, x0, py, color);
        put(img, x1, py, color);
    }
}

/// Fill the ellipse inscribed in the bounding box `(x0, y0)..(x1, y1)`.
pub fn fill_ellipse(img: &mut RgbaImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba) {
    scan_ellipse(img, x0, y0, x1, y1, color, None);
}

/// Stroke the ellipse inscribed in `(x0, y0)..(x1, y1)` with the given
/// width: the ring between the outer ellipse and one inset by `width`.
pub fn stroke_ellipse(img: &mut RgbaImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba, width: u32) {
    if width == 0 {
        return;
    }
    scan_ellipse(img, x0, y0, x1, y1, color, Some(width as f64));
}

fn scan_ellipse(
    img: &mut RgbaImage,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    color: Rgba,
    ring_width: Option<f64>,
) {
    let (x0, x1) = (x0.min(x1), x0.max(x1));
    let (y0, y1) = (y0.min(y1), y0.max(y1));
    let rx = (x1 - x0) / 2.0;
    let ry = (y1 - y0) / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let cx = (x0 + x1) / 2.0;
    let cy = (y0 + y1) / 2.0;
    let inner = ring_width.map(|w| ((rx - w).max(0.0), (ry - w).max(0.0)));

    let (w, h) = img.dimensions();
    let px0 = (x0.floor() as i64).max(0);
    let py0 = (y0.floor() as i64).max(0);
    let px1 = (x1.ceil() as i64).min(w as i64 - 1);
    let py1 = (y1.ceil() as i64).min(h as i64 - 1);

    for py in py0..=py1 {
        for px in px0..=px1 {
            let dx = (px as f64 + 0.5 - cx) / rx;
            let dy = (py as f64 + 0.5 - cy) / ry;
            if dx * dx + dy * dy > 1.0 {
                continue;
            }
            if let Some((irx, iry)) = inner {
                if irx > 0.0 && iry > 0.0 {
                    let idx = (px as f64 + 0.5 - cx) / irx;
                    let idy = (py as f64 + 0.5 - cy) / iry;
                    if idx * idx + idy * idy <= 1.0 {
                        continue;
                    }
                }
            }
            put(img, px, py, color);
        }
    }
}

/// Draw a straight segment with the given stroke width. A width above 1
/// stamps a width-sized square at each plotted position.
pub fn draw_segment(img: &mut RgbaImage, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgba, width: u32) {
    if width == 0 {
        return;
    }
    // Integer Bresenham over rounded endpoints.
    let (mut x, mut y) = (x0.round() as i64, y0.round() as i64);
    let (ex, ey) = (x1.round() as i64, y1.round() as i64);
    let dx = (ex - x).abs();
    let dy = -(ey - y).abs();
    let sx = if x < ex { 1 } else { -1 };
    let sy = if y < ey { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(img, x, y, color, width);
        if x == ex && y == ey {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Draw a connected polyline through `points`.
pub fn draw_polyline(img: &mut RgbaImage, points: &[(f64, f64)], color: Rgba, width: u32) {
    for pair in points.windows(2) {
        draw_segment(img, pair[0].0, pair[0].1, pair[1].0, pair[1].1, color, width);
    }
}

fn stamp(img: &mut RgbaImage, x: i64, y: i64, color: Rgba, width: u32) {
    if width <= 1 {
        put(img, x, y, color);
        return;
    }
    let half = width as i64 / 2;
    for oy in -half..(width as i64 - half) {
        for ox in -half..(width as i64 - half) {
            put(img, x + ox, y + oy, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]))
    }

    fn is_color(img: &RgbaImage, x: u32, y: u32, c: Rgba) -> bool {
        img.get_pixel(x, y).0 == [c.r, c.g, c.b, c.a]
    }

    #[test]
    fn test_fill_rect_overwrites_alpha() {
        let mut img = white_canvas(10, 10);
        let translucent = Rgba::new(255, 0, 0, 10);
        fill_rect(&mut img, 2.0, 2.0, 4.0, 4.0, translucent);
        // Overwrite semantics: the pixel takes the raw RGBA, no blending.
        assert!(is_color(&img, 3, 3, translucent));
        assert!(is_color(&img, 1, 1, Rgba::WHITE));
        assert!(is_color(&img, 5, 5, Rgba::WHITE));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut img = white_canvas(4, 4);
        fill_rect(&mut img, -10.0, -10.0, 100.0, 100.0, Rgba::BLACK);
        assert!(is_color(&img, 0, 0, Rgba::BLACK));
        assert!(is_color(&img, 3, 3, Rgba::BLACK));
    }

    #[test]
    fn test_outline_rect_leaves_interior() {
        let mut img = white_canvas(10, 10);
        outline_rect(&mut img, 1.0, 1.0, 8.0, 8.0, Rgba::BLACK);
        assert!(is_color(&img, 1, 1, Rgba::BLACK));
        assert!(is_color(&img, 8, 4, Rgba::BLACK));
        assert!(is_color(&img, 4, 4, Rgba::WHITE));
    }

    #[test]
    fn test_ellipse_center_and_corner() {
        let mut img = white_canvas(20, 20);
        fill_ellipse(&mut img, 0.0, 0.0, 19.0, 19.0, Rgba::BLACK);
        assert!(is_color(&img, 10, 10, Rgba::BLACK));
        // Bounding-box corners lie outside the ellipse.
        assert!(is_color(&img, 0, 0, Rgba::WHITE));
        assert!(is_color(&img, 19, 19, Rgba::WHITE));
    }

    #[test]
    fn test_segment_endpoints() {
        let mut img = white_canvas(10, 10);
        draw_segment(&mut img, 1.0, 1.0, 8.0, 8.0, Rgba::BLACK, 1);
        assert!(is_color(&img, 1, 1, Rgba::BLACK));
        assert!(is_color(&img, 8, 8, Rgba::BLACK));
        assert!(is_color(&img, 5, 5, Rgba::BLACK));
    }
}
