use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use atlas_prep_core::prelude::*;
use tempfile::TempDir;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).unwrap();
    }
    fs::write(path, b"not decoded").unwrap();
}

fn run(
    src: &Path,
    dst: &Path,
    commands: &[AtlasCommand],
) -> (Result<Vec<ResolvedAtlasCommand>>, Vec<LicenseRecord>) {
    let mut licenses = LicenseRecorder::default();
    let result = {
        let mut ctx = ResolveContext {
            src_root: src.to_path_buf(),
            dst_root: dst.to_path_buf(),
            path_resolver: PathResolver::new(),
            filename_analyzer: &ConventionFilenameAnalyzer,
            license_manager: &mut licenses,
            image_extensions: ImageExtensions::default(),
        };
        resolve_commands(commands, &mut ctx)
    };
    (result, licenses.into_records())
}

fn add_image(path: &str, dpi: u16, default_dpi: u16) -> AtlasCommand {
    let cfg = AtlasElementConfig::builder().default_dpi(default_dpi).build();
    AtlasCommand::AddImage(AtlasCommandAddImage::new(cfg, path, dpi, None).unwrap())
}

#[test]
fn explicit_dpi_conflicting_with_filename_fails() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "ui/icon_96dpi.png");
    let (result, _) = run(tmp.path(), &tmp.path().join("out"), &[add_image("ui/icon_96dpi.png", 120, 160)]);
    match result {
        Err(AtlasPrepError::ConflictingDpi {
            explicit, filename, ..
        }) => assert_eq!((explicit, filename), (120, 96)),
        other => panic!("expected ConflictingDpi, got {other:?}"),
    }
}

#[test]
fn dpi_falls_back_from_explicit_to_filename_to_default() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "ui/plain.png");
    touch(tmp.path(), "ui/hi_320dpi.png");
    let commands = [
        add_image("ui/plain.png", 0, 120),
        add_image("ui/plain.png", 96, 120),
        add_image("ui/hi_320dpi.png", 0, 120),
        add_image("ui/hi_320dpi.png", 320, 120),
    ];
    let (result, _) = run(tmp.path(), &tmp.path().join("out"), &commands);
    let resolved = result.unwrap();
    let dpis: Vec<u16> = resolved.iter().map(|r| r.images()[0].dpi).collect();
    assert_eq!(dpis, vec![120, 96, 320, 320]);
    assert_eq!(resolved[2].images()[0].atlas_path, "ui/hi");
    assert_eq!(resolved[0].images()[0].atlas_path, "ui/plain");
}

#[test]
fn missing_image_is_an_invalid_path() {
    let tmp = TempDir::new().unwrap();
    let (result, _) = run(tmp.path(), &tmp.path().join("out"), &[add_image("ui/nope.png", 0, 160)]);
    assert!(matches!(result, Err(AtlasPrepError::InvalidPath { .. })));
}

#[test]
fn license_next_to_source_is_recorded_once() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let dst = tmp.path().join("dst");
    touch(&src, "ui/a.png");
    touch(&src, "ui/b.png");
    touch(&src, "ui/LICENSE");
    touch(&src, "other/c.png");

    let commands = [
        add_image("ui/a.png", 0, 160),
        add_image("ui/b.png", 0, 160),
        add_image("other/c.png", 0, 160),
    ];
    let (result, licenses) = run(&src, &dst, &commands);
    result.unwrap();
    assert_eq!(licenses.len(), 1);
    assert!(licenses[0].license_file.ends_with("ui/LICENSE"));
    assert_eq!(licenses[0].dst_dir, dst.join("ui"));
}

#[test]
fn image_modifier_is_carried_through() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "ui/panel.9.png");
    let slice = NineSlice {
        slice: PxThickness::new(4, 4, 4, 4),
        content_margin: PxThickness::new(2, 2, 2, 2),
    };
    let modifier = ImageModifier::from_parts(Some(slice), None, None).unwrap();
    let cmd = AtlasCommand::AddImage(
        AtlasCommandAddImage::new(AtlasElementConfig::default(), "ui/panel.9.png", 0, modifier)
            .unwrap(),
    );
    let (result, _) = run(tmp.path(), &tmp.path().join("out"), &[cmd]);
    let resolved = result.unwrap();
    let image = &resolved[0].images()[0];
    assert!(image.is_patch);
    assert_eq!(image.atlas_path, "ui/panel");
    assert_eq!(image.modifier, Some(ImageModifier::NineSlice(slice)));
}

#[test]
fn modifiers_are_mutually_exclusive() {
    let slice = NineSlice::default();
    let anchors = AnchorPoints::new(vec![PxPoint::new(1, 2)]).unwrap();
    let err = ImageModifier::from_parts(Some(slice), None, Some(anchors)).unwrap_err();
    assert!(matches!(err, AtlasPrepError::ConflictingModifiers(_)));

    assert!(AnchorPoints::new(vec![]).is_err());
    let unordered = vec![
        PatchSlice {
            position: 4,
            stretch: true,
        },
        PatchSlice {
            position: 2,
            stretch: false,
        },
    ];
    assert!(ComplexPatch::new(unordered, vec![]).is_err());
}

#[test]
fn bitmap_font_command_resolves_and_loads() {
    let tmp = TempDir::new().unwrap();
    let fnt = "info face=\"Pixel\" size=16 padding=0,0,0,0 spacing=1,1\n\
               common lineHeight=20 base=10 scaleW=64 scaleH=64 pages=1 packed=0\n\
               page id=0 file=\"pixel_0.png\"\n\
               char id=65 x=0 y=0 width=8 height=12 xoffset=0 yoffset=1 xadvance=9 page=0 chnl=15\n";
    fs::create_dir_all(tmp.path().join("fonts")).unwrap();
    fs::write(tmp.path().join("fonts/pixel.fnt"), fnt).unwrap();

    let tweak = BitmapFontTweakConfig {
        base_line_px: 16,
        measure_char_id: 65,
        measure_height_px: 12,
        ..Default::default()
    };
    let cmd = AtlasCommand::AddBitmapFont(
        AtlasCommandAddBitmapFont::new(
            AtlasElementConfig::default(),
            "fonts/pixel.fnt",
            BitmapFontType::Bitmap,
            BTreeSet::from([FontOutputFormat::Basic, FontOutputFormat::Json]),
            Some("ui_font".into()),
            tweak,
            None,
        )
        .unwrap(),
    );
    let (result, _) = run(tmp.path(), &tmp.path().join("out"), &[cmd]);
    let resolved = result.unwrap();
    let ResolvedAtlasCommand::AddBitmapFont(font_cmd) = &resolved[0] else {
        panic!("expected a font command");
    };
    assert_eq!(font_cmd.dst_name, "ui_font");
    assert_eq!(font_cmd.atlas_path, "fonts/ui_font");
    assert!(resolved[0].images().is_empty());

    let font = load_bitmap_font(font_cmd).unwrap();
    assert_eq!(font.name, "ui_font");
    assert_eq!(font.base_line_px, 16);
    assert_eq!(font.line_spacing_px, 26);
    assert_eq!(font.chars[0].offset_px, PxPoint::new(0, 7));
}

#[test]
fn msdf_font_loads_with_stem_texture() {
    let tmp = TempDir::new().unwrap();
    let json = r#"{
        "atlas": { "type": "msdf", "distanceRange": 2, "size": 10, "width": 32, "height": 32 },
        "metrics": { "lineHeight": 1.2, "ascender": 0.8, "descender": -0.2 },
        "glyphs": [ { "unicode": 32, "advance": 0.3 } ]
    }"#;
    fs::create_dir_all(tmp.path().join("fonts")).unwrap();
    fs::write(tmp.path().join("fonts/Inter.json"), json).unwrap();

    let cmd = AtlasCommand::AddBitmapFont(
        AtlasCommandAddBitmapFont::new(
            AtlasElementConfig::default(),
            "fonts/Inter.json",
            BitmapFontType::Msdf,
            BTreeSet::from([FontOutputFormat::Binary]),
            None,
            BitmapFontTweakConfig::default(),
            None,
        )
        .unwrap(),
    );
    let (result, _) = run(tmp.path(), &tmp.path().join("out"), &[cmd]);
    let resolved = result.unwrap();
    let ResolvedAtlasCommand::AddBitmapFont(font_cmd) = &resolved[0] else {
        panic!("expected a font command");
    };
    assert_eq!(font_cmd.dst_name, "Inter");
    let font = load_bitmap_font(font_cmd).unwrap();
    assert_eq!(font.name, "Inter");
    assert_eq!(font.texture_file_name, "Inter.png");
    assert_eq!(font.base_line_px, 8);
    assert_eq!(font.line_spacing_px, 12);
}

#[test]
fn font_command_validation() {
    let make = |name: Option<&str>, tweak: BitmapFontTweakConfig| {
        AtlasCommandAddBitmapFont::new(
            AtlasElementConfig::default(),
            "fonts/a.fnt",
            BitmapFontType::Bitmap,
            BTreeSet::new(),
            name.map(str::to_string),
            tweak,
            None,
        )
    };
    assert!(make(Some(""), BitmapFontTweakConfig::default()).is_err());
    assert!(make(Some("a/b"), BitmapFontTweakConfig::default()).is_err());
    let measure_without_height = BitmapFontTweakConfig {
        measure_char_id: 65,
        ..Default::default()
    };
    assert!(matches!(
        make(None, measure_without_height),
        Err(AtlasPrepError::InvalidConfig(_))
    ));
    assert!(make(None, BitmapFontTweakConfig::default()).is_ok());
}

#[test]
fn unsupported_font_extension_fails_on_load() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "fonts/a.ttf");
    let cmd = AtlasCommand::AddBitmapFont(
        AtlasCommandAddBitmapFont::new(
            AtlasElementConfig::default(),
            "fonts/a.ttf",
            BitmapFontType::Bitmap,
            BTreeSet::new(),
            None,
            BitmapFontTweakConfig::default(),
            None,
        )
        .unwrap(),
    );
    let (result, _) = run(tmp.path(), &tmp.path().join("out"), &[cmd]);
    let resolved = result.unwrap();
    let ResolvedAtlasCommand::AddBitmapFont(font_cmd) = &resolved[0] else {
        panic!("expected a font command");
    };
    assert!(matches!(
        load_bitmap_font(font_cmd),
        Err(AtlasPrepError::UnsupportedFont { .. })
    ));
}
