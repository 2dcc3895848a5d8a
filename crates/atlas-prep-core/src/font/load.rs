use std::fs;
use tracing::{debug, instrument};

use super::bmfont::parse_bmfont_text;
use super::msdf::MsdfAtlasDescriptor;
use super::tweak::tweak;
use super::{BitmapFont, TraceInfo};
use crate::error::{AtlasPrepError, Result};
use crate::resolve::ResolvedAtlasCommandAddBitmapFont;

#[instrument(skip_all, fields(font = cmd.source_path.absolute_path()))]
/// Loads, normalizes and tweaks the font a resolved command points at.
///
/// `.fnt` files are read as BMFont text, `.json` files as msdf-atlas-gen atlases
/// (whose texture is expected next to the descriptor as `<stem>.png`).
pub fn load_bitmap_font(cmd: &ResolvedAtlasCommandAddBitmapFont) -> Result<BitmapFont> {
    let path = &cmd.source_path;
    let text = fs::read_to_string(path.to_path_buf())?;
    let dpi = cmd.element_config.default_dpi;
    let ext = path.extension().map(str::to_ascii_lowercase);

    let mut font = match ext.as_deref() {
        Some("fnt") => {
            parse_bmfont_text(&text)?.to_bitmap_font(dpi, cmd.font_type, cmd.sdf.as_ref())?
        }
        Some("json") => {
            let desc: MsdfAtlasDescriptor = serde_json::from_str(&text)?;
            let texture = format!("{}.png", path.file_stem());
            desc.to_bitmap_font(&cmd.dst_name, &texture, dpi, cmd.font_type, cmd.sdf.as_ref())?
        }
        _ => {
            return Err(AtlasPrepError::UnsupportedFont {
                name: path.absolute_path().to_string(),
                reason: "expected a .fnt or .json font descriptor".into(),
            });
        }
    };
    font.name = cmd.dst_name.clone();
    debug!(
        chars = font.chars.len(),
        kernings = font.kernings.len(),
        "font normalized"
    );

    let trace = TraceInfo::new("AddBitmapFont", path.absolute_path());
    tweak(&font, &cmd.tweak, cmd.sdf.as_ref(), &trace)
}
