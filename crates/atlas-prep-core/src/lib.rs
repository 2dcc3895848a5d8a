//! Normalization pipeline for texture atlas builds.
//!
//! - Commands: `AddImage` / `AddFolder` / `AddBitmapFont` resolve into path-checked, license-aware commands
//! - Folder scan: per-folder and per-file overrides, every override must land on an image
//! - Fonts: BMFont text and msdf-atlas-gen JSON both normalize into one `BitmapFont` model,
//!   followed by baseline tweaks and range compression into a `BasicFont`
//! - Data model is serde-serializable; packing and writers live outside this crate.
//!
//! Quick example:
//! ```ignore
//! use atlas_prep_core::prelude::*;
//! # fn main() -> anyhow::Result<()> {
//! let cfg = AtlasElementConfig::builder().default_dpi(160).build();
//! let cmd = AtlasCommand::AddFolder(AtlasCommandAddFolder::new(cfg, "ui", false, vec![], vec![])?);
//! let mut licenses = LicenseRecorder::default();
//! let mut ctx = ResolveContext {
//!     src_root: "assets".into(),
//!     dst_root: "out".into(),
//!     path_resolver: PathResolver::new(),
//!     filename_analyzer: &ConventionFilenameAnalyzer,
//!     license_manager: &mut licenses,
//!     image_extensions: ImageExtensions::default(),
//! };
//! let resolved = resolve_commands(&[cmd], &mut ctx)?;
//! println!("images: {}", resolved[0].images().len());
//! # Ok(()) }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod filename;
pub mod folder_mods;
pub mod font;
pub mod license;
pub mod model;
pub mod path;
pub mod resolve;

pub use command::*;
pub use config::*;
pub use error::*;
pub use filename::*;
pub use license::*;
pub use model::*;
pub use path::{PathResolver, ResolvedPath};
pub use resolve::*;

/// Convenience prelude for common types and functions.
/// Importing `atlas_prep_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::command::{
        AnchorPoints, AtlasCommand, AtlasCommandAddBitmapFont, AtlasCommandAddFolder,
        AtlasCommandAddImage, ComplexPatch, FileMod, FolderMod, ImageModifier, NineSlice,
        PatchSlice,
    };
    pub use crate::config::{AtlasElementConfig, AtlasElementConfigBuilder, ImageExtensions};
    pub use crate::error::{AtlasPrepError, Result};
    pub use crate::filename::{ConventionFilenameAnalyzer, FilenameAnalyzer, FilenameInfo};
    pub use crate::folder_mods::resolve_image_files;
    pub use crate::font::basic::{BasicFont, GlyphKerning, GlyphRange, extract_ranges, to_basic_font};
    pub use crate::font::bmfont::{BmFontDescriptor, parse_bmfont_text};
    pub use crate::font::msdf::MsdfAtlasDescriptor;
    pub use crate::font::tweak::tweak;
    pub use crate::font::{
        BitmapFont, BitmapFontChar, BitmapFontKerning, BitmapFontTweakConfig, BitmapFontType,
        FontOutputFormat, SdfFontConfig, SdfParams, TraceInfo, load_bitmap_font,
    };
    pub use crate::license::{LicenseCopyManager, LicenseRecord, LicenseRecorder};
    pub use crate::model::{PxPoint, PxThickness, Rect};
    pub use crate::path::{PathResolver, ResolvedPath};
    pub use crate::resolve::{
        ResolveContext, ResolvedAtlasCommand, ResolvedAtlasCommandAddBitmapFont,
        ResolvedAtlasCommandAddFolder, ResolvedAtlasCommandAddImage, ResolvedImageFile,
        resolve_commands,
    };
}
