use atlas_prep_core::prelude::*;

fn sample_font() -> BitmapFont {
    BitmapFont {
        name: "sample".into(),
        dpi: 160,
        size: 16,
        line_spacing_px: 20,
        base_line_px: 10,
        padding_px: PxThickness::default(),
        texture_file_name: "sample.png".into(),
        font_type: BitmapFontType::Bitmap,
        sdf: SdfParams::default(),
        chars: vec![
            BitmapFontChar {
                id: 65,
                src_rect_px: Rect::new(0, 0, 8, 12),
                offset_px: PxPoint::new(0, 1),
                x_advance_px: 9,
            },
            BitmapFontChar {
                id: 66,
                src_rect_px: Rect::new(8, 0, 8, 11),
                offset_px: PxPoint::new(1, -2),
                x_advance_px: 9,
            },
        ],
        kernings: vec![],
    }
}

fn trace() -> TraceInfo {
    TraceInfo::new("AddBitmapFont", "fonts/sample.fnt")
}

#[test]
fn noop_config_returns_identical_font() {
    let font = sample_font();
    let out = tweak(&font, &BitmapFontTweakConfig::default(), None, &trace()).unwrap();
    assert_eq!(out, font);
}

#[test]
fn baseline_change_shifts_every_glyph() {
    let font = sample_font();
    let cfg = BitmapFontTweakConfig {
        base_line_px: 16,
        ..Default::default()
    };
    let out = tweak(&font, &cfg, None, &trace()).unwrap();
    assert_eq!(out.base_line_px, 16);
    assert_eq!(out.line_spacing_px, 26);
    assert_eq!(out.chars[0].offset_px, PxPoint::new(0, 7));
    assert_eq!(out.chars[1].offset_px, PxPoint::new(1, 4));
    // glyph rects and advances are untouched
    assert_eq!(out.chars[0].src_rect_px, font.chars[0].src_rect_px);
    assert_eq!(out.chars[1].x_advance_px, 9);
}

#[test]
fn tweak_is_idempotent() {
    let cfg = BitmapFontTweakConfig {
        base_line_px: 16,
        ..Default::default()
    };
    let once = tweak(&sample_font(), &cfg, None, &trace()).unwrap();
    let twice = tweak(&once, &cfg, None, &trace()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn explicit_line_spacing_wins() {
    let cfg = BitmapFontTweakConfig {
        base_line_px: 16,
        line_spacing_px: 30,
        ..Default::default()
    };
    let out = tweak(&sample_font(), &cfg, None, &trace()).unwrap();
    assert_eq!(out.base_line_px, 16);
    assert_eq!(out.line_spacing_px, 30);
}

#[test]
fn measure_char_height_is_checked() {
    let ok = BitmapFontTweakConfig {
        measure_char_id: 65,
        measure_height_px: 12,
        ..Default::default()
    };
    assert!(tweak(&sample_font(), &ok, None, &trace()).is_ok());

    let mismatch = BitmapFontTweakConfig {
        measure_char_id: 66,
        measure_height_px: 12,
        ..Default::default()
    };
    match tweak(&sample_font(), &mismatch, None, &trace()) {
        Err(AtlasPrepError::MeasureHeightMismatch {
            char_id,
            expected,
            actual,
            trace,
        }) => {
            assert_eq!((char_id, expected, actual), (66, 12, 11));
            assert!(trace.contains("fonts/sample.fnt"));
        }
        other => panic!("expected MeasureHeightMismatch, got {other:?}"),
    }
}

#[test]
fn missing_measure_char_is_not_found() {
    let cfg = BitmapFontTweakConfig {
        measure_char_id: 0x4E00,
        measure_height_px: 12,
        ..Default::default()
    };
    let err = tweak(&sample_font(), &cfg, None, &trace()).unwrap_err();
    assert!(matches!(err, AtlasPrepError::NotFound { char_id: 0x4E00, .. }));
    assert!(err.to_string().contains("AddBitmapFont"));
}

#[test]
fn sdf_settings_replace_font_params() {
    let mut font = sample_font();
    font.font_type = BitmapFontType::Sdf;
    font.sdf.spread = 4.0;

    let keep_spread = SdfFontConfig {
        spread: 0.0,
        desired_base_line_px: 12,
    };
    let out = tweak(&font, &BitmapFontTweakConfig::default(), Some(&keep_spread), &trace()).unwrap();
    assert_eq!(out.sdf.spread, 4.0);
    assert_eq!(out.sdf.desired_base_line_px, 12);
    assert_eq!(out.chars, font.chars);

    let new_spread = SdfFontConfig {
        spread: 8.0,
        desired_base_line_px: 12,
    };
    let out = tweak(&font, &BitmapFontTweakConfig::default(), Some(&new_spread), &trace()).unwrap();
    assert_eq!(out.sdf.spread, 8.0);
}

#[test]
fn negative_line_spacing_is_out_of_range() {
    let mut font = sample_font();
    font.base_line_px = 40;
    font.line_spacing_px = 5;
    let cfg = BitmapFontTweakConfig {
        base_line_px: 10,
        ..Default::default()
    };
    let err = tweak(&font, &cfg, None, &trace()).unwrap_err();
    assert!(matches!(err, AtlasPrepError::ValueOutOfRange { value: -25, .. }));
}

#[test]
fn rebasing_moves_offsets_and_line_spacing_together() {
    let mut font = sample_font();
    font.line_spacing_px = 14;
    font.chars[0].offset_px = PxPoint::new(0, 2);
    let cfg = BitmapFontTweakConfig {
        base_line_px: 16,
        ..Default::default()
    };
    let out = tweak(&font, &cfg, None, &trace()).unwrap();
    assert_eq!(out.line_spacing_px, 20);
    assert_eq!(out.chars[0].offset_px, PxPoint::new(0, 8));
}
