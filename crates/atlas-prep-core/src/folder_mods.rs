//! Folder scanning with per-folder and per-file overrides.
//!
//! Every override must match at least one discovered image. Stale overrides
//! (for renamed or removed files) are reported together after the full scan.

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::command::{FileMod, FolderMod, ImageModifier, ensure_unique_keys};
use crate::config::{AtlasElementConfig, ImageExtensions};
use crate::error::{AtlasPrepError, Result};
use crate::filename::FilenameAnalyzer;
use crate::path::{PathResolver, ResolvedPath, join_relative, to_forward_slashes};
use crate::resolve::ResolvedImageFile;

struct FolderModState<'a> {
    entry: &'a FolderMod,
    touched: bool,
}

/// Scans `folder` recursively and resolves every image it contains.
///
/// Files are visited in file-name order so results are deterministic. A file
/// matched by both a folder mod (its directory) and a file mod (its path) gets
/// the folder mod first and the file mod on top. A dpi encoded in the filename
/// always wins over the config's default dpi.
#[instrument(skip_all, fields(folder = folder.absolute_path()))]
pub fn resolve_image_files(
    folder: &ResolvedPath,
    extensions: &ImageExtensions,
    base_config: &AtlasElementConfig,
    keep_dpi_in_filename: bool,
    folder_mods: &[FolderMod],
    file_mods: &[FileMod],
    analyzer: &dyn FilenameAnalyzer,
) -> Result<Vec<ResolvedImageFile>> {
    ensure_unique_keys("folder mod", folder_mods.iter().map(FolderMod::path))?;
    ensure_unique_keys("file mod", file_mods.iter().map(FileMod::path))?;

    let mut folder_lookup: HashMap<&str, FolderModState> = folder_mods
        .iter()
        .map(|m| (m.path(), FolderModState { entry: m, touched: false }))
        .collect();
    let mut file_lookup: HashMap<&str, &FileMod> =
        file_mods.iter().map(|m| (m.path(), m)).collect();

    let resolver = PathResolver::new();
    let root = folder.to_path_buf();
    let base_dir = Path::new(folder.parent_path());
    let mut files = Vec::new();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches_ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(e));
        if !matches_ext {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(&root) else {
            continue;
        };
        let rel = to_forward_slashes(&rel.to_string_lossy());
        let rel_dir = match rel.rfind('/') {
            Some(idx) => &rel[..idx],
            None => "",
        };

        let source_path =
            resolver.combine_discovered(base_dir, &join_relative(folder.unresolved_source_path(), &rel))?;
        let info = analyzer.analyze(&source_path, keep_dpi_in_filename)?;
        let atlas_path = join_relative(
            &join_relative(folder.unresolved_source_path(), rel_dir),
            &info.normalized_name,
        );

        let mut element_config = *base_config;
        let mut modifier: Option<ImageModifier> = None;
        if let Some(state) = folder_lookup.get_mut(rel_dir) {
            state.touched = true;
            element_config = *state.entry.element_config();
        }
        if let Some(file_mod) = file_lookup.remove(rel.as_str()) {
            element_config = *file_mod.element_config();
            modifier = file_mod.modifier().cloned();
        }
        let dpi = if info.dpi != 0 {
            info.dpi
        } else {
            element_config.default_dpi
        };

        debug!(%rel, %atlas_path, dpi, "image discovered");
        files.push(ResolvedImageFile {
            element_config,
            source_path,
            atlas_path,
            is_patch: info.is_patch,
            dpi,
            modifier,
        });
    }

    // report in declaration order
    let unused_folder_mods: Vec<String> = folder_mods
        .iter()
        .filter(|m| folder_lookup.get(m.path()).is_some_and(|s| !s.touched))
        .map(|m| display_key(m.path()))
        .collect();
    let unused_file_mods: Vec<String> = file_mods
        .iter()
        .filter(|m| file_lookup.contains_key(m.path()))
        .map(|m| display_key(m.path()))
        .collect();
    if !unused_folder_mods.is_empty() || !unused_file_mods.is_empty() {
        return Err(AtlasPrepError::UnusedMods {
            folder_mods: unused_folder_mods,
            file_mods: unused_file_mods,
        });
    }
    Ok(files)
}

fn display_key(key: &str) -> String {
    if key.is_empty() {
        ".".into()
    } else {
        key.to_string()
    }
}
