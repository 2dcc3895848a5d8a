//! Declarative atlas commands, validated at construction.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::config::AtlasElementConfig;
use crate::error::{AtlasPrepError, Result};
use crate::font::{BitmapFontTweakConfig, BitmapFontType, FontOutputFormat, SdfFontConfig};
use crate::model::{PxPoint, PxThickness};
use crate::path::{normalize_relative, validate_relative_path};

/// Classic nine-slice stretch borders.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct NineSlice {
    pub slice: PxThickness,
    pub content_margin: PxThickness,
}

/// One stretch boundary along an axis of a complex patch.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PatchSlice {
    pub position: u32,
    /// Whether the span starting at `position` may be stretched.
    pub stretch: bool,
}

/// Multi-span stretch description.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ComplexPatch {
    slices_x: Vec<PatchSlice>,
    slices_y: Vec<PatchSlice>,
}

impl ComplexPatch {
    /// Both axes need at least one slice, with strictly ascending positions.
    pub fn new(slices_x: Vec<PatchSlice>, slices_y: Vec<PatchSlice>) -> Result<Self> {
        for (axis, slices) in [("x", &slices_x), ("y", &slices_y)] {
            if slices.is_empty() {
                return Err(AtlasPrepError::InvalidConfig(format!(
                    "complex patch needs at least one {axis} slice"
                )));
            }
            if slices.windows(2).any(|w| w[0].position >= w[1].position) {
                return Err(AtlasPrepError::InvalidConfig(format!(
                    "complex patch {axis} slices must be strictly ascending"
                )));
            }
        }
        Ok(Self { slices_x, slices_y })
    }

    pub fn slices_x(&self) -> &[PatchSlice] {
        &self.slices_x
    }

    pub fn slices_y(&self) -> &[PatchSlice] {
        &self.slices_y
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnchorPoints {
    points: Vec<PxPoint>,
}

impl AnchorPoints {
    pub fn new(points: Vec<PxPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(AtlasPrepError::InvalidConfig(
                "anchor point list can not be empty".into(),
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[PxPoint] {
        &self.points
    }
}

/// Extra per-image metadata; an image carries at most one.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageModifier {
    NineSlice(NineSlice),
    ComplexPatch(ComplexPatch),
    AnchorPoints(AnchorPoints),
}

impl ImageModifier {
    /// Picks the single modifier out of independently parsed optional parts.
    pub fn from_parts(
        nine_slice: Option<NineSlice>,
        complex_patch: Option<ComplexPatch>,
        anchor_points: Option<AnchorPoints>,
    ) -> Result<Option<Self>> {
        let set: Vec<&str> = [
            nine_slice.is_some().then_some("nine_slice"),
            complex_patch.is_some().then_some("complex_patch"),
            anchor_points.is_some().then_some("anchor_points"),
        ]
        .into_iter()
        .flatten()
        .collect();
        if set.len() > 1 {
            return Err(AtlasPrepError::ConflictingModifiers(format!(
                "only one of {} may be set",
                set.join(", ")
            )));
        }
        Ok(nine_slice
            .map(Self::NineSlice)
            .or_else(|| complex_patch.map(Self::ComplexPatch))
            .or_else(|| anchor_points.map(Self::AnchorPoints)))
    }
}

/// Replaces the element config for every image directly inside a folder.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FolderMod {
    path: String,
    element_config: AtlasElementConfig,
}

impl FolderMod {
    /// `path` is relative to the scanned folder; `"."` names the folder itself.
    pub fn new(path: &str, element_config: AtlasElementConfig) -> Result<Self> {
        validate_relative_path(path)?;
        element_config.validate()?;
        Ok(Self {
            path: normalize_relative(path)?,
            element_config,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn element_config(&self) -> &AtlasElementConfig {
        &self.element_config
    }
}

/// Replaces the element config (and optionally adds a modifier) for one image.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileMod {
    path: String,
    element_config: AtlasElementConfig,
    modifier: Option<ImageModifier>,
}

impl FileMod {
    /// `path` is relative to the scanned folder and includes the extension.
    pub fn new(
        path: &str,
        element_config: AtlasElementConfig,
        modifier: Option<ImageModifier>,
    ) -> Result<Self> {
        validate_relative_path(path)?;
        element_config.validate()?;
        let path = normalize_relative(path)?;
        if path.is_empty() {
            return Err(AtlasPrepError::InvalidPath {
                path,
                reason: "file mod must name a file".into(),
            });
        }
        Ok(Self {
            path,
            element_config,
            modifier,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn element_config(&self) -> &AtlasElementConfig {
        &self.element_config
    }

    pub fn modifier(&self) -> Option<&ImageModifier> {
        self.modifier.as_ref()
    }
}

/// Fails on the first key that appears twice.
pub(crate) fn ensure_unique_keys<'a>(
    kind: &'static str,
    keys: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(AtlasPrepError::DuplicateModKey {
                kind,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AtlasCommandAddImage {
    element_config: AtlasElementConfig,
    source_path: String,
    dpi: u16,
    modifier: Option<ImageModifier>,
}

impl AtlasCommandAddImage {
    /// `dpi` of 0 defers to the filename or the element config.
    pub fn new(
        element_config: AtlasElementConfig,
        source_path: &str,
        dpi: u16,
        modifier: Option<ImageModifier>,
    ) -> Result<Self> {
        element_config.validate()?;
        validate_relative_path(source_path)?;
        Ok(Self {
            element_config,
            source_path: normalize_relative(source_path)?,
            dpi,
            modifier,
        })
    }

    pub fn element_config(&self) -> &AtlasElementConfig {
        &self.element_config
    }
    pub fn source_path(&self) -> &str {
        &self.source_path
    }
    pub fn dpi(&self) -> u16 {
        self.dpi
    }
    pub fn modifier(&self) -> Option<&ImageModifier> {
        self.modifier.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AtlasCommandAddFolder {
    element_config: AtlasElementConfig,
    folder_path: String,
    keep_dpi_in_filename: bool,
    folder_mods: Vec<FolderMod>,
    file_mods: Vec<FileMod>,
}

impl AtlasCommandAddFolder {
    pub fn new(
        element_config: AtlasElementConfig,
        folder_path: &str,
        keep_dpi_in_filename: bool,
        folder_mods: Vec<FolderMod>,
        file_mods: Vec<FileMod>,
    ) -> Result<Self> {
        element_config.validate()?;
        validate_relative_path(folder_path)?;
        ensure_unique_keys("folder mod", folder_mods.iter().map(FolderMod::path))?;
        ensure_unique_keys("file mod", file_mods.iter().map(FileMod::path))?;
        Ok(Self {
            element_config,
            folder_path: normalize_relative(folder_path)?,
            keep_dpi_in_filename,
            folder_mods,
            file_mods,
        })
    }

    pub fn element_config(&self) -> &AtlasElementConfig {
        &self.element_config
    }
    pub fn folder_path(&self) -> &str {
        &self.folder_path
    }
    pub fn keep_dpi_in_filename(&self) -> bool {
        self.keep_dpi_in_filename
    }
    pub fn folder_mods(&self) -> &[FolderMod] {
        &self.folder_mods
    }
    pub fn file_mods(&self) -> &[FileMod] {
        &self.file_mods
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AtlasCommandAddBitmapFont {
    element_config: AtlasElementConfig,
    source_path: String,
    font_type: BitmapFontType,
    output_formats: BTreeSet<FontOutputFormat>,
    name: Option<String>,
    tweak: BitmapFontTweakConfig,
    sdf: Option<SdfFontConfig>,
}

impl AtlasCommandAddBitmapFont {
    pub fn new(
        element_config: AtlasElementConfig,
        source_path: &str,
        font_type: BitmapFontType,
        output_formats: BTreeSet<FontOutputFormat>,
        name: Option<String>,
        tweak: BitmapFontTweakConfig,
        sdf: Option<SdfFontConfig>,
    ) -> Result<Self> {
        element_config.validate()?;
        validate_relative_path(source_path)?;
        if let Some(name) = &name {
            if name.trim().is_empty() {
                return Err(AtlasPrepError::InvalidConfig(
                    "font name can not be empty".into(),
                ));
            }
            if name.contains(['/', '\\']) {
                return Err(AtlasPrepError::InvalidConfig(format!(
                    "font name '{name}' can not contain path separators"
                )));
            }
        }
        if tweak.measure_char_id != 0 && tweak.measure_height_px == 0 {
            return Err(AtlasPrepError::InvalidConfig(
                "measure_char_id requires a nonzero measure_height_px".into(),
            ));
        }
        Ok(Self {
            element_config,
            source_path: normalize_relative(source_path)?,
            font_type,
            output_formats,
            name,
            tweak,
            sdf,
        })
    }

    pub fn element_config(&self) -> &AtlasElementConfig {
        &self.element_config
    }
    pub fn source_path(&self) -> &str {
        &self.source_path
    }
    pub fn font_type(&self) -> BitmapFontType {
        self.font_type
    }
    pub fn output_formats(&self) -> &BTreeSet<FontOutputFormat> {
        &self.output_formats
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn tweak(&self) -> &BitmapFontTweakConfig {
        &self.tweak
    }
    pub fn sdf(&self) -> Option<&SdfFontConfig> {
        self.sdf.as_ref()
    }
}

/// A pre-resolution atlas build command.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AtlasCommand {
    AddImage(AtlasCommandAddImage),
    AddFolder(AtlasCommandAddFolder),
    AddBitmapFont(AtlasCommandAddBitmapFont),
}

impl AtlasCommand {
    /// Short name used in logs and trace info.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddImage(_) => "AddImage",
            Self::AddFolder(_) => "AddFolder",
            Self::AddBitmapFont(_) => "AddBitmapFont",
        }
    }

    /// The command's source path as written.
    pub fn source_path(&self) -> &str {
        match self {
            Self::AddImage(c) => c.source_path(),
            Self::AddFolder(c) => c.folder_path(),
            Self::AddBitmapFont(c) => c.source_path(),
        }
    }
}
