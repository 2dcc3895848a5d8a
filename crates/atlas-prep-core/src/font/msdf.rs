//! msdf-atlas-gen JSON atlas descriptors.
//!
//! Metrics are in em units and must be scaled by the atlas font size; atlas
//! bounds are texture pixels. Both use `yOrigin` to declare the Y direction.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{
    BitmapFont, BitmapFontChar, BitmapFontKerning, BitmapFontType, SdfFontConfig, SdfParams,
    ensure_unique_chars, narrow,
};
use crate::error::{AtlasPrepError, Result};
use crate::model::{PxPoint, PxThickness, Rect};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsdfAtlas {
    #[serde(rename = "type")]
    pub atlas_type: String,
    #[serde(default)]
    pub distance_range: f64,
    /// Font size in pixels per em.
    pub size: f64,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_y_origin")]
    pub y_origin: String,
}

fn default_y_origin() -> String {
    "bottom".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsdfMetrics {
    #[serde(default = "default_em_size")]
    pub em_size: f64,
    pub line_height: f64,
    pub ascender: f64,
    pub descender: f64,
}

fn default_em_size() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MsdfBounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsdfGlyph {
    pub unicode: u32,
    pub advance: f64,
    #[serde(default)]
    pub plane_bounds: Option<MsdfBounds>,
    #[serde(default)]
    pub atlas_bounds: Option<MsdfBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsdfKerning {
    pub unicode1: u32,
    pub unicode2: u32,
    pub advance: f64,
}

/// A decoded msdf-atlas-gen JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsdfAtlasDescriptor {
    pub atlas: MsdfAtlas,
    #[serde(default)]
    pub name: Option<String>,
    pub metrics: MsdfMetrics,
    pub glyphs: Vec<MsdfGlyph>,
    #[serde(default)]
    pub kerning: Vec<MsdfKerning>,
}

/// Glyph encoding declared by `atlas.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdfAtlasType {
    SoftMask,
    Sdf,
    Msdf,
    Mtsdf,
}

impl FromStr for SdfAtlasType {
    type Err = AtlasPrepError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "softmask" => Ok(Self::SoftMask),
            "sdf" => Ok(Self::Sdf),
            "msdf" => Ok(Self::Msdf),
            "mtsdf" => Ok(Self::Mtsdf),
            _ => Err(AtlasPrepError::UnknownValue {
                kind: "atlas type",
                value: s.to_string(),
            }),
        }
    }
}

impl SdfAtlasType {
    pub fn font_type(self) -> BitmapFontType {
        match self {
            Self::SoftMask => BitmapFontType::Bitmap,
            Self::Sdf => BitmapFontType::Sdf,
            Self::Msdf => BitmapFontType::Msdf,
            Self::Mtsdf => BitmapFontType::Mtsdf,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YOrigin {
    Top,
    Bottom,
}

impl FromStr for YOrigin {
    type Err = AtlasPrepError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(AtlasPrepError::UnknownValue {
                kind: "y origin",
                value: s.to_string(),
            }),
        }
    }
}

/// Unit conversion for one atlas: em -> pixel and atlas -> texture coordinates.
#[derive(Debug, Clone, Copy)]
struct Converter {
    font_size: f64,
    em_size: f64,
    origin: YOrigin,
    texture_height: u32,
}

impl Converter {
    fn em_to_px(&self, value: f64) -> i64 {
        (self.font_size * value * self.em_size).round() as i64
    }

    /// Vertical draw offset; bottom-origin values are flipped about the baseline.
    fn offset_y(&self, top_px: i64, base_line_px: i64) -> i64 {
        match self.origin {
            YOrigin::Bottom => base_line_px - top_px,
            YOrigin::Top => top_px,
        }
    }

    /// Texture Y; bottom-origin values are flipped about the last pixel row.
    /// Floored so the coordinate never points past a valid pixel.
    fn texture_y(&self, value: f64) -> i64 {
        let y = value.floor() as i64;
        match self.origin {
            YOrigin::Bottom => i64::from(self.texture_height) - 1 - y,
            YOrigin::Top => y,
        }
    }

    fn src_rect(&self, bounds: &MsdfBounds) -> Result<Rect> {
        let left = bounds.left.floor() as i64;
        let right = bounds.right.floor() as i64;
        // bottom-origin atlases have top above bottom in value space
        let (y, h) = match self.origin {
            YOrigin::Bottom => (
                self.texture_y(bounds.top),
                bounds.top.floor() as i64 - bounds.bottom.floor() as i64,
            ),
            YOrigin::Top => (
                self.texture_y(bounds.top),
                bounds.bottom.floor() as i64 - bounds.top.floor() as i64,
            ),
        };
        Ok(Rect::new(
            narrow("atlasBounds left", left)?,
            narrow("atlasBounds top", y)?,
            narrow("atlasBounds width", right - left)?,
            narrow("atlasBounds height", h)?,
        ))
    }
}

impl MsdfAtlasDescriptor {
    /// Converts to the canonical model.
    ///
    /// `expected` must match the atlas' own type. `sdf` may override the
    /// distance range (when its spread is > 0) and supplies the desired baseline.
    pub fn to_bitmap_font(
        &self,
        fallback_name: &str,
        texture_file_name: &str,
        dpi: u16,
        expected: BitmapFontType,
        sdf: Option<&SdfFontConfig>,
    ) -> Result<BitmapFont> {
        let atlas_type: SdfAtlasType = self.atlas.atlas_type.parse()?;
        let origin: YOrigin = self.atlas.y_origin.parse()?;
        let font_type = atlas_type.font_type();
        if font_type != expected {
            return Err(AtlasPrepError::FontTypeMismatch {
                expected,
                actual: font_type,
            });
        }

        let conv = Converter {
            font_size: self.atlas.size,
            em_size: self.metrics.em_size,
            origin,
            texture_height: self.atlas.height,
        };

        // top-origin atlases store the ascender negated
        let base_line = conv.em_to_px(self.metrics.ascender.abs());
        let line_spacing = conv.em_to_px(self.metrics.line_height);

        let chars = self
            .glyphs
            .iter()
            .map(|g| -> Result<BitmapFontChar> {
                let (src_rect_px, offset_px) = match (&g.atlas_bounds, &g.plane_bounds) {
                    (Some(atlas), Some(plane)) => {
                        let x = conv.em_to_px(plane.left);
                        let y = conv.offset_y(conv.em_to_px(plane.top), base_line);
                        (
                            conv.src_rect(atlas)?,
                            PxPoint::new(narrow("planeBounds left", x)?, narrow("planeBounds top", y)?),
                        )
                    }
                    // whitespace glyphs only advance
                    _ => (Rect::default(), PxPoint::default()),
                };
                Ok(BitmapFontChar {
                    id: g.unicode,
                    src_rect_px,
                    offset_px,
                    x_advance_px: narrow("advance", conv.em_to_px(g.advance))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| fallback_name.to_string());
        ensure_unique_chars(&name, &chars)?;

        let kernings = self
            .kerning
            .iter()
            .map(|k| -> Result<BitmapFontKerning> {
                Ok(BitmapFontKerning {
                    first: k.unicode1,
                    second: k.unicode2,
                    amount_px: narrow("kerning advance", conv.em_to_px(k.advance))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let spread = match sdf {
            Some(cfg) if cfg.spread > 0.0 => cfg.spread,
            _ => self.atlas.distance_range as f32,
        };

        Ok(BitmapFont {
            name,
            dpi,
            size: narrow("size", self.atlas.size.round() as i64)?,
            line_spacing_px: narrow("lineHeight", line_spacing)?,
            base_line_px: narrow("ascender", base_line)?,
            padding_px: PxThickness::default(),
            texture_file_name: texture_file_name.to_string(),
            font_type,
            sdf: SdfParams {
                spread,
                desired_base_line_px: sdf.map(|c| c.desired_base_line_px).unwrap_or(0),
            },
            chars,
            kernings,
        })
    }
}
