use image::RgbaImage;
use std::collections::HashMap;

use super::BitmapFont;
use crate::model::Rect;

/// Computes the opaque area of `area` inside `rgba` (alpha > `threshold`).
///
/// The returned rectangle is relative to `area`'s top-left corner. `None`
/// means the area is fully transparent or lies outside the image.
pub fn compute_trim_rect(rgba: &RgbaImage, area: Rect, threshold: u8) -> Option<Rect> {
    let (w, h) = rgba.dimensions();
    if area.is_empty() || area.x >= w || area.y >= h {
        return None;
    }
    let x_end = area.x.saturating_add(area.w).min(w);
    let y_end = area.y.saturating_add(area.h).min(h);
    let opaque = |x: u32, y: u32| rgba.get_pixel(x, y)[3] > threshold;
    let column_has = |x: u32, y1: u32, y2: u32| (y1..y2).any(|y| opaque(x, y));
    let row_has = |y: u32, x1: u32, x2: u32| (x1..x2).any(|x| opaque(x, y));

    // left
    let mut x1 = area.x;
    while x1 < x_end && !column_has(x1, area.y, y_end) {
        x1 += 1;
    }
    if x1 >= x_end {
        return None;
    }
    // right (exclusive)
    let mut x2 = x_end;
    while x2 > x1 + 1 && !column_has(x2 - 1, area.y, y_end) {
        x2 -= 1;
    }
    // top
    let mut y1 = area.y;
    while y1 < y_end && !row_has(y1, x1, x2) {
        y1 += 1;
    }
    // bottom (exclusive)
    let mut y2 = y_end;
    while y2 > y1 + 1 && !row_has(y2 - 1, x1, x2) {
        y2 -= 1;
    }
    Some(Rect::new(x1 - area.x, y1 - area.y, x2 - x1, y2 - y1))
}

/// Trim rectangles for every glyph of `font` with visible pixels in `texture`.
pub fn glyph_trim_rects(font: &BitmapFont, texture: &RgbaImage, threshold: u8) -> HashMap<u32, Rect> {
    font.chars
        .iter()
        .filter_map(|c| compute_trim_rect(texture, c.src_rect_px, threshold).map(|r| (c.id, r)))
        .collect()
}
