//! Canonical bitmap font model and the stages that produce and refine it.
//!
//! - `bmfont`: AngelCode BMFont text descriptors -> `BitmapFont`
//! - `msdf`: msdf-atlas-gen JSON descriptors -> `BitmapFont`
//! - `tweak`: baseline / line spacing normalization
//! - `basic`: range-compressed `BasicFont`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AtlasPrepError, Result};
use crate::model::{PxPoint, PxThickness, Rect};

pub mod basic;
pub mod bmfont;
mod load;
pub mod msdf;
#[cfg(feature = "image")]
pub mod trim;
pub mod tweak;

pub use load::load_bitmap_font;

/// How glyph pixels are encoded in the font texture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BitmapFontType {
    /// Plain coverage/alpha glyphs.
    #[default]
    Bitmap,
    /// Single channel signed distance field.
    Sdf,
    /// Multi-channel signed distance field.
    Msdf,
    /// Multi-channel + true distance in alpha.
    Mtsdf,
}

impl FromStr for BitmapFontType {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bitmap" => Ok(Self::Bitmap),
            "sdf" => Ok(Self::Sdf),
            "msdf" => Ok(Self::Msdf),
            "mtsdf" => Ok(Self::Mtsdf),
            _ => Err(()),
        }
    }
}

/// Output files a font command asks the writer stage to produce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FontOutputFormat {
    /// Range-compressed `BasicFont`.
    Basic,
    /// Binary canonical font.
    #[serde(alias = "nbf")]
    Binary,
    /// JSON canonical font.
    Json,
}

impl FromStr for FontOutputFormat {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "binary" | "nbf" => Ok(Self::Binary),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Caller supplied distance-field settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct SdfFontConfig {
    /// Distance range in pixels; only used when > 0.
    #[serde(default)]
    pub spread: f32,
    /// Baseline the font should be rebased to when rendered.
    #[serde(default)]
    pub desired_base_line_px: u16,
}

/// Distance-field parameters stored on the canonical font.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct SdfParams {
    pub spread: f32,
    pub desired_base_line_px: u16,
}

/// Requested metric adjustments; zero means "leave as is".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BitmapFontTweakConfig {
    #[serde(default)]
    pub base_line_px: u16,
    #[serde(default)]
    pub line_spacing_px: u16,
    /// Char used to validate the glyph height, 0 disables the check.
    #[serde(default)]
    pub measure_char_id: u32,
    #[serde(default)]
    pub measure_height_px: u16,
}

impl BitmapFontTweakConfig {
    pub fn is_noop(&self) -> bool {
        self.base_line_px == 0 && self.line_spacing_px == 0 && self.measure_char_id == 0
    }
}

/// Where a font came from, carried into validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceInfo {
    pub command: String,
    pub source: String,
}

impl TraceInfo {
    pub fn new(command: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for TraceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command '{}', source '{}'", self.command, self.source)
    }
}

/// A glyph in the canonical model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BitmapFontChar {
    /// Unicode code point.
    pub id: u32,
    /// Glyph pixels inside the font texture.
    pub src_rect_px: Rect,
    /// Draw offset from the pen position at the top of the line.
    pub offset_px: PxPoint,
    pub x_advance_px: u16,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BitmapFontKerning {
    pub first: u32,
    pub second: u32,
    pub amount_px: i32,
}

/// The canonical font every source format is normalized into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BitmapFont {
    pub name: String,
    pub dpi: u16,
    /// Nominal size in pixels.
    pub size: u16,
    pub line_spacing_px: u16,
    pub base_line_px: u16,
    pub padding_px: PxThickness,
    pub texture_file_name: String,
    pub font_type: BitmapFontType,
    pub sdf: SdfParams,
    pub chars: Vec<BitmapFontChar>,
    pub kernings: Vec<BitmapFontKerning>,
}

impl BitmapFont {
    pub fn find_char(&self, id: u32) -> Option<&BitmapFontChar> {
        self.chars.iter().find(|c| c.id == id)
    }
}

/// Narrows a source value to the model's fixed-width field type.
/// Char ids must be unique within one font.
pub(crate) fn ensure_unique_chars(font: &str, chars: &[BitmapFontChar]) -> Result<()> {
    let mut seen = std::collections::HashSet::with_capacity(chars.len());
    match chars.iter().find(|c| !seen.insert(c.id)) {
        Some(dup) => Err(AtlasPrepError::DuplicateChar {
            font: font.to_string(),
            char_id: dup.id,
        }),
        None => Ok(()),
    }
}

pub(crate) fn narrow<T: TryFrom<i64>>(field: &'static str, value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| AtlasPrepError::ValueOutOfRange { field, value })
}
