//! YAML/JSON command files.
//!
//! ```yaml
//! defaults:
//!   element: { default_dpi: 160, shape_padding: 2 }
//!   image_extensions: [png, jpg]
//! commands:
//!   - kind: add_folder
//!     path: icons
//!     folder_mods: [{ path: small, element: { default_dpi: 120 } }]
//!   - kind: add_bitmap_font
//!     path: fonts/Roboto.json
//!     type: msdf
//!     output_formats: [basic, json]
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::Context;
use atlas_prep_core::prelude::*;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct ElementOverrides {
    default_dpi: Option<u16>,
    extrude: Option<u16>,
    trim: Option<bool>,
    trim_margin: Option<u16>,
    transparency_threshold: Option<u8>,
    shape_padding: Option<u16>,
    border_padding: Option<u16>,
}

impl ElementOverrides {
    fn apply(&self, mut cfg: AtlasElementConfig) -> AtlasElementConfig {
        if let Some(v) = self.default_dpi {
            cfg.default_dpi = v;
        }
        if let Some(v) = self.extrude {
            cfg.extrude = v;
        }
        if let Some(v) = self.trim {
            cfg.trim = v;
        }
        if let Some(v) = self.trim_margin {
            cfg.trim_margin = v;
        }
        if let Some(v) = self.transparency_threshold {
            cfg.transparency_threshold = v;
        }
        if let Some(v) = self.shape_padding {
            cfg.shape_padding = v;
        }
        if let Some(v) = self.border_padding {
            cfg.border_padding = v;
        }
        cfg
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    element: ElementOverrides,
    image_extensions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct NineSliceEntry {
    /// left, top, right, bottom
    slice: [u16; 4],
    content_margin: Option<[u16; 4]>,
}

#[derive(Debug, Deserialize)]
struct PatchSliceEntry {
    position: u32,
    #[serde(default)]
    stretch: bool,
}

#[derive(Debug, Deserialize)]
struct ComplexPatchEntry {
    x: Vec<PatchSliceEntry>,
    y: Vec<PatchSliceEntry>,
}

#[derive(Debug, Deserialize, Default)]
struct ModifierEntry {
    nine_slice: Option<NineSliceEntry>,
    complex_patch: Option<ComplexPatchEntry>,
    anchor_points: Option<Vec<[i32; 2]>>,
}

impl ModifierEntry {
    fn build(self) -> Result<Option<ImageModifier>> {
        let thickness = |[l, t, r, b]: [u16; 4]| PxThickness::new(l, t, r, b);
        let nine_slice = self.nine_slice.map(|n| NineSlice {
            slice: thickness(n.slice),
            content_margin: n.content_margin.map(thickness).unwrap_or_default(),
        });
        let slices = |v: Vec<PatchSliceEntry>| -> Vec<PatchSlice> {
            v.into_iter()
                .map(|s| PatchSlice {
                    position: s.position,
                    stretch: s.stretch,
                })
                .collect()
        };
        let complex_patch = self
            .complex_patch
            .map(|c| ComplexPatch::new(slices(c.x), slices(c.y)))
            .transpose()?;
        let anchor_points = self
            .anchor_points
            .map(|pts| AnchorPoints::new(pts.into_iter().map(|[x, y]| PxPoint::new(x, y)).collect()))
            .transpose()?;
        ImageModifier::from_parts(nine_slice, complex_patch, anchor_points)
    }
}

#[derive(Debug, Deserialize)]
struct AddImageEntry {
    path: String,
    #[serde(default)]
    dpi: u16,
    #[serde(default)]
    element: ElementOverrides,
    #[serde(flatten)]
    modifier: ModifierEntry,
}

#[derive(Debug, Deserialize)]
struct FolderModEntry {
    path: String,
    #[serde(default)]
    element: ElementOverrides,
}

#[derive(Debug, Deserialize)]
struct FileModEntry {
    path: String,
    #[serde(default)]
    element: ElementOverrides,
    #[serde(flatten)]
    modifier: ModifierEntry,
}

#[derive(Debug, Deserialize)]
struct AddFolderEntry {
    path: String,
    #[serde(default)]
    keep_dpi_in_filename: bool,
    #[serde(default)]
    element: ElementOverrides,
    #[serde(default)]
    folder_mods: Vec<FolderModEntry>,
    #[serde(default)]
    file_mods: Vec<FileModEntry>,
}

#[derive(Debug, Deserialize)]
struct AddBitmapFontEntry {
    path: String,
    #[serde(rename = "type", default)]
    font_type: BitmapFontType,
    #[serde(default)]
    output_formats: BTreeSet<FontOutputFormat>,
    name: Option<String>,
    #[serde(default)]
    element: ElementOverrides,
    #[serde(default)]
    tweak: BitmapFontTweakConfig,
    sdf: Option<SdfFontConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum CommandEntry {
    AddImage(AddImageEntry),
    AddFolder(AddFolderEntry),
    AddBitmapFont(AddBitmapFontEntry),
}

#[derive(Debug, Deserialize)]
pub struct CommandFile {
    #[serde(default)]
    defaults: Defaults,
    commands: Vec<CommandEntry>,
}

impl CommandFile {
    /// Reads `.json` files as JSON and everything else as YAML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let file = if is_json {
            serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?
        } else {
            serde_yaml::from_str(&text).with_context(|| format!("parse {}", path.display()))?
        };
        Ok(file)
    }

    pub fn image_extensions(&self) -> ImageExtensions {
        match &self.defaults.image_extensions {
            Some(list) => ImageExtensions::new(list),
            None => ImageExtensions::default(),
        }
    }

    /// Builds validated core commands; the first invalid entry fails with its index.
    pub fn commands(self) -> anyhow::Result<Vec<AtlasCommand>> {
        let base = self.defaults.element.apply(AtlasElementConfig::default());
        self.commands
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| {
                build_command(entry, &base).with_context(|| format!("command #{idx}"))
            })
            .collect()
    }
}

fn build_command(entry: CommandEntry, base: &AtlasElementConfig) -> Result<AtlasCommand> {
    Ok(match entry {
        CommandEntry::AddImage(e) => AtlasCommand::AddImage(AtlasCommandAddImage::new(
            e.element.apply(*base),
            &e.path,
            e.dpi,
            e.modifier.build()?,
        )?),
        CommandEntry::AddFolder(e) => {
            let element = e.element.apply(*base);
            let folder_mods = e
                .folder_mods
                .into_iter()
                .map(|m| FolderMod::new(&m.path, m.element.apply(element)))
                .collect::<Result<Vec<_>>>()?;
            let file_mods = e
                .file_mods
                .into_iter()
                .map(|m| -> Result<FileMod> {
                    FileMod::new(&m.path, m.element.apply(element), m.modifier.build()?)
                })
                .collect::<Result<Vec<_>>>()?;
            AtlasCommand::AddFolder(AtlasCommandAddFolder::new(
                element,
                &e.path,
                e.keep_dpi_in_filename,
                folder_mods,
                file_mods,
            )?)
        }
        CommandEntry::AddBitmapFont(e) => {
            AtlasCommand::AddBitmapFont(AtlasCommandAddBitmapFont::new(
                e.element.apply(*base),
                &e.path,
                e.font_type,
                e.output_formats,
                e.name,
                e.tweak,
                e.sdf,
            )?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
defaults:
  element: { default_dpi: 120, shape_padding: 4 }
  image_extensions: [png]
commands:
  - kind: add_image
    path: ui/panel.9.png
    nine_slice: { slice: [4, 4, 4, 4] }
  - kind: add_folder
    path: icons
    folder_mods:
      - { path: small, element: { default_dpi: 96 } }
    file_mods:
      - path: small/arrow.png
        anchor_points: [[1, 2], [3, 4]]
  - kind: add_bitmap_font
    path: fonts/Roboto.json
    type: msdf
    output_formats: [basic, nbf]
    tweak: { base_line_px: 16 }
"#;

    fn parse_yaml(text: &str) -> CommandFile {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn yaml_commands_build_core_commands() {
        let file = parse_yaml(YAML);
        let exts = file.image_extensions();
        assert!(exts.contains("png"));
        assert!(!exts.contains("jpg"));

        let commands = file.commands().unwrap();
        assert_eq!(commands.len(), 3);
        match &commands[0] {
            AtlasCommand::AddImage(cmd) => {
                assert_eq!(cmd.element_config().default_dpi, 120);
                assert_eq!(cmd.element_config().shape_padding, 4);
                assert!(matches!(cmd.modifier(), Some(ImageModifier::NineSlice(_))));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &commands[1] {
            AtlasCommand::AddFolder(cmd) => {
                assert_eq!(cmd.folder_mods()[0].element_config().default_dpi, 96);
                // overrides start from the folder's own config
                assert_eq!(cmd.folder_mods()[0].element_config().shape_padding, 4);
                assert!(matches!(
                    cmd.file_mods()[0].modifier(),
                    Some(ImageModifier::AnchorPoints(_))
                ));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &commands[2] {
            AtlasCommand::AddBitmapFont(cmd) => {
                assert_eq!(cmd.font_type(), BitmapFontType::Msdf);
                assert!(cmd.output_formats().contains(&FontOutputFormat::Binary));
                assert_eq!(cmd.tweak().base_line_px, 16);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn conflicting_modifiers_name_the_command() {
        let file = parse_yaml(
            r#"
commands:
  - kind: add_image
    path: a.png
    nine_slice: { slice: [1, 1, 1, 1] }
    anchor_points: [[0, 0]]
"#,
        );
        let err = file.commands().unwrap_err();
        assert!(format!("{err:#}").contains("command #0"));
    }

    #[test]
    fn json_files_are_accepted() {
        let file: CommandFile = serde_json::from_str(
            r#"{ "commands": [ { "kind": "add_folder", "path": "ui" } ] }"#,
        )
        .unwrap();
        let commands = file.commands().unwrap();
        assert_eq!(commands[0].kind(), "AddFolder");
    }
}
