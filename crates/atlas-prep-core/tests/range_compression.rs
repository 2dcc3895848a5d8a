use std::collections::HashMap;

use atlas_prep_core::prelude::*;

fn range(from: u32, length: u32, offset: u32) -> GlyphRange {
    GlyphRange {
        from,
        length,
        offset,
    }
}

fn glyph(id: u32, x_offset: i32, y_offset: i32, advance: u16) -> BitmapFontChar {
    BitmapFontChar {
        id,
        src_rect_px: Rect::new(id, 0, 8, 12),
        offset_px: PxPoint::new(x_offset, y_offset),
        x_advance_px: advance,
    }
}

fn font_with(chars: Vec<BitmapFontChar>) -> BitmapFont {
    BitmapFont {
        name: "ranges".into(),
        dpi: 160,
        size: 16,
        line_spacing_px: 20,
        base_line_px: 14,
        padding_px: PxThickness::default(),
        texture_file_name: "ranges.png".into(),
        font_type: BitmapFontType::Bitmap,
        sdf: SdfParams::default(),
        chars,
        kernings: vec![],
    }
}

#[test]
fn consecutive_ids_fold_into_runs() {
    let ranges = extract_ranges(&[65, 66, 67, 70, 71, 90]);
    assert_eq!(
        ranges,
        vec![range(65, 3, 0), range(70, 2, 3), range(90, 1, 5)]
    );
}

#[test]
fn control_run_below_printable_is_dropped() {
    // 31 starts below 32 but the run reaches into the printable area
    let ranges = extract_ranges(&[10, 11, 31, 32, 33]);
    assert_eq!(ranges, vec![range(31, 3, 0)]);

    let ranges = extract_ranges(&[10, 11, 32, 33]);
    assert_eq!(ranges, vec![range(32, 2, 0)]);
}

#[test]
fn run_ending_exactly_at_printable_is_dropped() {
    let ids: Vec<u32> = (0..32).collect();
    assert!(extract_ranges(&ids).is_empty());
}

#[test]
fn empty_and_single_inputs() {
    assert!(extract_ranges(&[]).is_empty());
    assert_eq!(extract_ranges(&[32]), vec![range(32, 1, 0)]);
    assert_eq!(
        extract_ranges(&[u32::MAX - 1, u32::MAX]),
        vec![range(u32::MAX - 1, 2, 0)]
    );
}

#[test]
fn basic_font_has_one_record_per_kept_glyph() {
    let font = font_with(vec![
        glyph(66, 1, 2, 9),
        glyph(65, 0, 1, 8),
        glyph(5, 0, 0, 0),
        glyph(90, 2, 3, 10),
    ]);
    let basic = to_basic_font(&font, &HashMap::new());

    assert_eq!(basic.ranges, vec![range(65, 2, 0), range(90, 1, 2)]);
    assert_eq!(basic.kernings.len(), 3);
    assert_eq!(
        basic.kernings[0],
        GlyphKerning {
            offset_x: 0,
            offset_y: 1,
            layout_width: 8
        }
    );
    assert_eq!(basic.kernings[2].layout_width, 10);
    assert_eq!(basic.header.name, "ranges");
    assert_eq!(basic.header.base_line_px, 14);
    assert_eq!(basic.header.line_spacing_px, 20);
}

#[test]
fn trim_rect_shifts_glyph_offset() {
    let font = font_with(vec![glyph(65, 1, 2, 8)]);
    let trims = HashMap::from([(65, Rect::new(2, 3, 4, 6))]);
    let basic = to_basic_font(&font, &trims);
    assert_eq!(basic.kernings[0].offset_x, 3);
    assert_eq!(basic.kernings[0].offset_y, 5);
    assert_eq!(basic.kernings[0].layout_width, 8);
}

#[test]
fn parsed_bmfont_keeps_every_printable_glyph() {
    let text = r#"info face="Mono" size=16 padding=0,0,0,0 spacing=1,1
common lineHeight=20 base=10 scaleW=64 scaleH=64 pages=1 packed=0
page id=0 file="mono.png"
chars count=5
char id=9  x=0  y=0 width=0 height=0  xoffset=0 yoffset=0 xadvance=32 page=0 chnl=15
char id=32 x=0  y=0 width=0 height=0  xoffset=0 yoffset=0 xadvance=4  page=0 chnl=15
char id=65 x=0  y=0 width=7 height=10 xoffset=0 yoffset=1 xadvance=8  page=0 chnl=15
char id=66 x=8  y=0 width=7 height=10 xoffset=1 yoffset=1 xadvance=8  page=0 chnl=15
char id=90 x=16 y=0 width=7 height=10 xoffset=0 yoffset=2 xadvance=9  page=0 chnl=15
"#;
    let font = parse_bmfont_text(text)
        .unwrap()
        .to_bitmap_font(160, BitmapFontType::Bitmap, None)
        .unwrap();
    let basic = to_basic_font(&font, &HashMap::new());

    // the tab sits below the printable range and is dropped
    assert_eq!(
        basic.ranges,
        vec![range(32, 1, 0), range(65, 2, 1), range(90, 1, 3)]
    );
    assert_eq!(basic.kernings.len(), 4);
    assert_eq!(basic.kernings[0].layout_width, 4);
    assert_eq!(basic.kernings[2].offset_x, 1);
    assert_eq!(basic.kernings[3].layout_width, 9);
}
