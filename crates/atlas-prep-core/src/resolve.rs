use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::command::{
    AtlasCommand, AtlasCommandAddBitmapFont, AtlasCommandAddFolder, AtlasCommandAddImage,
    ImageModifier,
};
use crate::config::{AtlasElementConfig, ImageExtensions};
use crate::error::{AtlasPrepError, Result};
use crate::filename::FilenameAnalyzer;
use crate::folder_mods::resolve_image_files;
use crate::font::{BitmapFontTweakConfig, BitmapFontType, FontOutputFormat, SdfFontConfig};
use crate::license::LicenseCopyManager;
use crate::path::{PathResolver, ResolvedPath, join_relative};

/// Shared state for resolving a batch of commands.
pub struct ResolveContext<'a> {
    /// Root the command source paths are relative to.
    pub src_root: PathBuf,
    /// Root of the output tree (license destinations).
    pub dst_root: PathBuf,
    pub path_resolver: PathResolver,
    pub filename_analyzer: &'a dyn FilenameAnalyzer,
    pub license_manager: &'a mut dyn LicenseCopyManager,
    pub image_extensions: ImageExtensions,
}

impl ResolveContext<'_> {
    fn record_licenses(&mut self, source: &ResolvedPath) -> Result<()> {
        let dst_dir = self.dst_root.join(source.unresolved_directory());
        self.license_manager
            .resolve_license_files(Path::new(source.directory()), &dst_dir)
    }
}

/// A concrete image ready for the layout stage.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolvedImageFile {
    pub element_config: AtlasElementConfig,
    pub source_path: ResolvedPath,
    /// Name of the element inside the atlas (relative, no extension).
    pub atlas_path: String,
    pub is_patch: bool,
    pub dpi: u16,
    pub modifier: Option<ImageModifier>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolvedAtlasCommandAddImage {
    pub image: ResolvedImageFile,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResolvedAtlasCommandAddFolder {
    pub element_config: AtlasElementConfig,
    pub folder_path: ResolvedPath,
    pub files: Vec<ResolvedImageFile>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResolvedAtlasCommandAddBitmapFont {
    pub element_config: AtlasElementConfig,
    pub source_path: ResolvedPath,
    pub font_type: BitmapFontType,
    pub output_formats: BTreeSet<FontOutputFormat>,
    /// Where the font's glyph sheet lives inside the atlas.
    pub atlas_path: String,
    /// Filename stem for the written font files.
    pub dst_name: String,
    pub tweak: BitmapFontTweakConfig,
    pub sdf: Option<SdfFontConfig>,
}

/// A command after path resolution.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedAtlasCommand {
    AddImage(ResolvedAtlasCommandAddImage),
    AddFolder(ResolvedAtlasCommandAddFolder),
    AddBitmapFont(ResolvedAtlasCommandAddBitmapFont),
}

impl ResolvedAtlasCommand {
    /// Every image this command contributes to the atlas.
    pub fn images(&self) -> &[ResolvedImageFile] {
        match self {
            Self::AddImage(c) => std::slice::from_ref(&c.image),
            Self::AddFolder(c) => &c.files,
            Self::AddBitmapFont(_) => &[],
        }
    }
}

impl AtlasCommand {
    pub fn resolve(&self, ctx: &mut ResolveContext<'_>) -> Result<ResolvedAtlasCommand> {
        debug!(kind = self.kind(), source = self.source_path(), "resolving command");
        match self {
            Self::AddImage(cmd) => resolve_add_image(cmd, ctx).map(ResolvedAtlasCommand::AddImage),
            Self::AddFolder(cmd) => {
                resolve_add_folder(cmd, ctx).map(ResolvedAtlasCommand::AddFolder)
            }
            Self::AddBitmapFont(cmd) => {
                resolve_add_bitmap_font(cmd, ctx).map(ResolvedAtlasCommand::AddBitmapFont)
            }
        }
    }
}

#[instrument(skip_all)]
/// Resolves `commands` in order; the first failing command aborts the batch.
pub fn resolve_commands(
    commands: &[AtlasCommand],
    ctx: &mut ResolveContext<'_>,
) -> Result<Vec<ResolvedAtlasCommand>> {
    let resolved = commands
        .iter()
        .map(|cmd| cmd.resolve(ctx))
        .collect::<Result<Vec<_>>>()?;
    let images: usize = resolved.iter().map(|r| r.images().len()).sum();
    info!(commands = resolved.len(), images, "commands resolved");
    Ok(resolved)
}

fn require_file(path: &ResolvedPath) -> Result<()> {
    if !path.to_path_buf().is_file() {
        return Err(AtlasPrepError::InvalidPath {
            path: path.absolute_path().to_string(),
            reason: "file not found".into(),
        });
    }
    Ok(())
}

fn resolve_add_image(
    cmd: &AtlasCommandAddImage,
    ctx: &mut ResolveContext<'_>,
) -> Result<ResolvedAtlasCommandAddImage> {
    cmd.element_config().validate()?;
    let source_path = ctx.path_resolver.combine(&ctx.src_root, cmd.source_path())?;
    require_file(&source_path)?;
    let info = ctx.filename_analyzer.analyze(&source_path, false)?;
    if cmd.dpi() != 0 && info.dpi != 0 && cmd.dpi() != info.dpi {
        return Err(AtlasPrepError::ConflictingDpi {
            path: source_path.absolute_path().to_string(),
            explicit: cmd.dpi(),
            filename: info.dpi,
        });
    }
    let dpi = match (cmd.dpi(), info.dpi) {
        (0, 0) => cmd.element_config().default_dpi,
        (0, from_name) => from_name,
        (explicit, _) => explicit,
    };
    let atlas_path = join_relative(source_path.unresolved_directory(), &info.normalized_name);
    ctx.record_licenses(&source_path)?;
    Ok(ResolvedAtlasCommandAddImage {
        image: ResolvedImageFile {
            element_config: *cmd.element_config(),
            source_path,
            atlas_path,
            is_patch: info.is_patch,
            dpi,
            modifier: cmd.modifier().cloned(),
        },
    })
}

fn resolve_add_folder(
    cmd: &AtlasCommandAddFolder,
    ctx: &mut ResolveContext<'_>,
) -> Result<ResolvedAtlasCommandAddFolder> {
    cmd.element_config().validate()?;
    let folder_path = ctx.path_resolver.combine(&ctx.src_root, cmd.folder_path())?;
    if !folder_path.to_path_buf().is_dir() {
        return Err(AtlasPrepError::InvalidPath {
            path: folder_path.absolute_path().to_string(),
            reason: "folder not found".into(),
        });
    }
    let files = resolve_image_files(
        &folder_path,
        &ctx.image_extensions,
        cmd.element_config(),
        cmd.keep_dpi_in_filename(),
        cmd.folder_mods(),
        cmd.file_mods(),
        ctx.filename_analyzer,
    )?;
    if files.is_empty() {
        warn!(folder = folder_path.absolute_path(), "folder contains no images");
    }
    let mut seen_dirs = HashSet::new();
    for file in &files {
        if seen_dirs.insert(file.source_path.directory().to_string()) {
            ctx.record_licenses(&file.source_path)?;
        }
    }
    Ok(ResolvedAtlasCommandAddFolder {
        element_config: *cmd.element_config(),
        folder_path,
        files,
    })
}

fn resolve_add_bitmap_font(
    cmd: &AtlasCommandAddBitmapFont,
    ctx: &mut ResolveContext<'_>,
) -> Result<ResolvedAtlasCommandAddBitmapFont> {
    cmd.element_config().validate()?;
    let source_path = ctx.path_resolver.combine(&ctx.src_root, cmd.source_path())?;
    require_file(&source_path)?;
    let dst_name = cmd
        .name()
        .unwrap_or_else(|| source_path.file_stem())
        .to_string();
    let atlas_path = join_relative(source_path.unresolved_directory(), &dst_name);
    if cmd.output_formats().is_empty() {
        warn!(font = %dst_name, "no font output formats requested");
    }
    ctx.record_licenses(&source_path)?;
    Ok(ResolvedAtlasCommandAddBitmapFont {
        element_config: *cmd.element_config(),
        source_path,
        font_type: cmd.font_type(),
        output_formats: cmd.output_formats().clone(),
        atlas_path,
        dst_name,
        tweak: *cmd.tweak(),
        sdf: cmd.sdf().copied(),
    })
}
