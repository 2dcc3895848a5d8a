#![cfg(feature = "image")]

use std::collections::HashMap;

use atlas_prep_core::font::trim::{compute_trim_rect, glyph_trim_rects};
use atlas_prep_core::prelude::*;
use image::{Rgba, RgbaImage};

fn texture_with_dots(w: u32, h: u32, dots: &[(u32, u32, u8)]) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 0]));
    for &(x, y, a) in dots {
        img.put_pixel(x, y, Rgba([255, 255, 255, a]));
    }
    img
}

#[test]
fn trim_rect_is_relative_to_area() {
    let img = texture_with_dots(16, 16, &[(5, 6, 255), (7, 9, 255)]);
    let r = compute_trim_rect(&img, Rect::new(4, 4, 8, 8), 0).expect("visible");
    assert_eq!(r, Rect::new(1, 2, 3, 4));
}

#[test]
fn threshold_and_empty_areas() {
    let img = texture_with_dots(8, 8, &[(2, 2, 10)]);
    assert!(compute_trim_rect(&img, Rect::new(0, 0, 8, 8), 10).is_none());
    assert_eq!(
        compute_trim_rect(&img, Rect::new(0, 0, 8, 8), 9),
        Some(Rect::new(2, 2, 1, 1))
    );
    assert!(compute_trim_rect(&img, Rect::new(0, 0, 0, 4), 0).is_none());
    assert!(compute_trim_rect(&img, Rect::new(9, 0, 2, 2), 0).is_none());
}

#[test]
fn glyph_trims_feed_basic_font_offsets() {
    let img = texture_with_dots(32, 16, &[(2, 3, 255), (17, 1, 255)]);
    let glyph = |id: u32, x: u32| BitmapFontChar {
        id,
        src_rect_px: Rect::new(x, 0, 8, 8),
        offset_px: PxPoint::new(1, 1),
        x_advance_px: 9,
    };
    let font = BitmapFont {
        name: "dots".into(),
        dpi: 160,
        size: 8,
        line_spacing_px: 10,
        base_line_px: 7,
        padding_px: PxThickness::default(),
        texture_file_name: "dots.png".into(),
        font_type: BitmapFontType::Bitmap,
        sdf: SdfParams::default(),
        chars: vec![glyph(65, 0), glyph(66, 8), glyph(67, 16)],
        kernings: vec![],
    };
    let trims = glyph_trim_rects(&font, &img, 0);
    assert_eq!(
        trims,
        HashMap::from([(65, Rect::new(2, 3, 1, 1)), (67, Rect::new(1, 1, 1, 1))])
    );

    let basic = to_basic_font(&font, &trims);
    let offsets: Vec<(i32, i32)> = basic
        .kernings
        .iter()
        .map(|k| (k.offset_x, k.offset_y))
        .collect();
    assert_eq!(offsets, vec![(3, 4), (1, 1), (2, 2)]);
}
