//! AngelCode BMFont text descriptors.
//!
//! Format reference: one tag per line (`info`, `common`, `page`, `chars`,
//! `char`, `kernings`, `kerning`) followed by `key=value` pairs. Values may be
//! quoted; `padding` and `spacing` are comma lists.

use serde::{Deserialize, Serialize};

use super::{
    BitmapFont, BitmapFontChar, BitmapFontKerning, BitmapFontType, SdfFontConfig, SdfParams,
    ensure_unique_chars, narrow,
};
use crate::error::{AtlasPrepError, Result};
use crate::model::{PxPoint, PxThickness, Rect};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmFontInfo {
    pub face: String,
    pub size: i32,
    /// up, right, down, left
    pub padding: [i32; 4],
    /// horizontal, vertical
    pub spacing: [i32; 2],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmFontCommon {
    pub line_height: i32,
    pub base: i32,
    pub scale_w: i32,
    pub scale_h: i32,
    pub pages: i32,
    pub packed: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmFontPage {
    pub id: i32,
    pub file: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmFontChar {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_advance: i32,
    pub page: i32,
    pub chnl: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmFontKerning {
    pub first: u32,
    pub second: u32,
    pub amount: i32,
}

/// A decoded BMFont file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BmFontDescriptor {
    pub info: BmFontInfo,
    pub common: BmFontCommon,
    pub pages: Vec<BmFontPage>,
    pub chars: Vec<BmFontChar>,
    pub kernings: Vec<BmFontKerning>,
}

impl BmFontDescriptor {
    /// Converts to the canonical model.
    ///
    /// Only single page, non-packed fonts are supported. Metrics are copied
    /// verbatim and narrowed to the model's field widths.
    pub fn to_bitmap_font(
        &self,
        dpi: u16,
        font_type: BitmapFontType,
        sdf: Option<&SdfFontConfig>,
    ) -> Result<BitmapFont> {
        let unsupported = |reason: String| AtlasPrepError::UnsupportedFont {
            name: self.info.face.clone(),
            reason,
        };
        if self.pages.len() != 1 || self.common.pages > 1 {
            return Err(unsupported(format!(
                "only single page fonts are supported, found {} page(s)",
                self.pages.len().max(self.common.pages.max(0) as usize)
            )));
        }
        if self.common.packed != 0 {
            return Err(unsupported("packed fonts are not supported".into()));
        }

        let [up, right, down, left] = self.info.padding;
        let padding_px = PxThickness::new(
            narrow("padding left", left.into())?,
            narrow("padding up", up.into())?,
            narrow("padding right", right.into())?,
            narrow("padding down", down.into())?,
        );

        let chars = self
            .chars
            .iter()
            .map(|c| -> Result<BitmapFontChar> {
                Ok(BitmapFontChar {
                    id: c.id,
                    src_rect_px: Rect::new(
                        narrow("char x", c.x.into())?,
                        narrow("char y", c.y.into())?,
                        narrow("char width", c.width.into())?,
                        narrow("char height", c.height.into())?,
                    ),
                    offset_px: PxPoint::new(c.x_offset, c.y_offset),
                    x_advance_px: narrow("char xadvance", c.x_advance.into())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        ensure_unique_chars(&self.info.face, &chars)?;

        let kernings = self
            .kernings
            .iter()
            .map(|k| BitmapFontKerning {
                first: k.first,
                second: k.second,
                amount_px: k.amount,
            })
            .collect();

        let sdf = sdf
            .map(|cfg| SdfParams {
                spread: cfg.spread,
                desired_base_line_px: cfg.desired_base_line_px,
            })
            .unwrap_or_default();

        Ok(BitmapFont {
            name: self.info.face.clone(),
            dpi,
            size: narrow("size", self.info.size.into())?,
            line_spacing_px: narrow("lineHeight", self.common.line_height.into())?,
            base_line_px: narrow("base", self.common.base.into())?,
            padding_px,
            texture_file_name: self.pages[0].file.clone(),
            font_type,
            sdf,
            chars,
            kernings,
        })
    }
}

/// Parses the BMFont text format.
pub fn parse_bmfont_text(text: &str) -> Result<BmFontDescriptor> {
    let mut desc = BmFontDescriptor::default();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (tag, rest) = match trimmed.find(char::is_whitespace) {
            Some(pos) => (&trimmed[..pos], &trimmed[pos..]),
            None => (trimmed, ""),
        };
        let fields = Fields::parse(rest, line)?;
        match tag {
            "info" => {
                desc.info = BmFontInfo {
                    face: fields.string("face").unwrap_or_default(),
                    size: fields.int("size")?.unwrap_or(0),
                    padding: fields.int_list::<4>("padding")?.unwrap_or_default(),
                    spacing: fields.int_list::<2>("spacing")?.unwrap_or_default(),
                }
            }
            "common" => {
                desc.common = BmFontCommon {
                    line_height: fields.required_int("lineHeight")?,
                    base: fields.required_int("base")?,
                    scale_w: fields.int("scaleW")?.unwrap_or(0),
                    scale_h: fields.int("scaleH")?.unwrap_or(0),
                    pages: fields.int("pages")?.unwrap_or(1),
                    packed: fields.int("packed")?.unwrap_or(0),
                }
            }
            "page" => desc.pages.push(BmFontPage {
                id: fields.required_int("id")?,
                file: fields.string("file").ok_or_else(|| Fields::missing(line, "file"))?,
            }),
            "char" => desc.chars.push(BmFontChar {
                id: fields.required_id("id")?,
                x: fields.int("x")?.unwrap_or(0),
                y: fields.int("y")?.unwrap_or(0),
                width: fields.int("width")?.unwrap_or(0),
                height: fields.int("height")?.unwrap_or(0),
                x_offset: fields.int("xoffset")?.unwrap_or(0),
                y_offset: fields.int("yoffset")?.unwrap_or(0),
                x_advance: fields.int("xadvance")?.unwrap_or(0),
                page: fields.int("page")?.unwrap_or(0),
                chnl: fields.int("chnl")?.unwrap_or(15),
            }),
            "kerning" => desc.kernings.push(BmFontKerning {
                first: fields.required_id("first")?,
                second: fields.required_id("second")?,
                amount: fields.required_int("amount")?,
            }),
            // counts are implied by the entries themselves
            _ => {}
        }
    }
    Ok(desc)
}

/// `key=value` pairs of one descriptor line.
struct Fields<'a> {
    line: usize,
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Fields<'a> {
    fn parse(rest: &'a str, line: usize) -> Result<Self> {
        let mut pairs = Vec::new();
        let bytes = rest.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() {
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos >= bytes.len() {
                break;
            }
            let key_start = pos;
            while pos < bytes.len() && bytes[pos] != b'=' && !bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            let key = &rest[key_start..pos];
            if pos >= bytes.len() || bytes[pos] != b'=' {
                // bare word without a value
                pairs.push((key, ""));
                continue;
            }
            pos += 1;
            let value = if pos < bytes.len() && bytes[pos] == b'"' {
                let value_start = pos + 1;
                let Some(len) = rest[value_start..].find('"') else {
                    return Err(AtlasPrepError::Parse {
                        line,
                        reason: format!("unterminated quote in '{key}'"),
                    });
                };
                pos = value_start + len + 1;
                &rest[value_start..value_start + len]
            } else {
                let value_start = pos;
                while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                &rest[value_start..pos]
            };
            pairs.push((key, value));
        }
        Ok(Self { line, pairs })
    }

    fn missing(line: usize, key: &str) -> AtlasPrepError {
        AtlasPrepError::Parse {
            line,
            reason: format!("missing '{key}'"),
        }
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn int(&self, key: &str) -> Result<Option<i32>> {
        self.get(key)
            .map(|v| {
                v.parse::<i32>().map_err(|_| AtlasPrepError::Parse {
                    line: self.line,
                    reason: format!("'{key}' is not an integer: '{v}'"),
                })
            })
            .transpose()
    }

    fn required_int(&self, key: &str) -> Result<i32> {
        self.int(key)?.ok_or_else(|| Self::missing(self.line, key))
    }

    fn required_id(&self, key: &str) -> Result<u32> {
        let value = self.required_int(key)?;
        u32::try_from(value).map_err(|_| AtlasPrepError::Parse {
            line: self.line,
            reason: format!("'{key}' can not be negative: {value}"),
        })
    }

    fn int_list<const N: usize>(&self, key: &str) -> Result<Option<[i32; N]>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        let mut out = [0i32; N];
        let mut count = 0;
        for part in raw.split(',') {
            if count >= N {
                count += 1;
                break;
            }
            out[count] = part.trim().parse().map_err(|_| AtlasPrepError::Parse {
                line: self.line,
                reason: format!("'{key}' is not an integer list: '{raw}'"),
            })?;
            count += 1;
        }
        if count != N {
            return Err(AtlasPrepError::Parse {
                line: self.line,
                reason: format!("'{key}' expects {N} values: '{raw}'"),
            });
        }
        Ok(Some(out))
    }
}
