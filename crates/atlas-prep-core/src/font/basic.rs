//! Range-compressed font form.
//!
//! Glyph ids are folded into runs of consecutive ids; each run points at its
//! slice of the per-glyph kerning/offset table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{BitmapFont, BitmapFontType, SdfParams};
use crate::model::{PxThickness, Rect};

/// First printable id; runs that end before it are dropped.
pub const FIRST_PRINTABLE_ID: u32 = 32;

/// A run of consecutive glyph ids.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlyphRange {
    pub from: u32,
    pub length: u32,
    /// Index of the run's first entry in `BasicFont::kernings`.
    pub offset: u32,
}

/// Per-glyph layout record of the compressed form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlyphKerning {
    pub offset_x: i32,
    pub offset_y: i32,
    pub layout_width: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasicFontHeader {
    pub name: String,
    pub dpi: u16,
    pub size: u16,
    pub line_spacing_px: u16,
    pub base_line_px: u16,
    pub padding_px: PxThickness,
    pub texture_file_name: String,
    pub font_type: BitmapFontType,
    pub sdf: SdfParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BasicFont {
    pub header: BasicFontHeader,
    pub ranges: Vec<GlyphRange>,
    pub kernings: Vec<GlyphKerning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    FindBegin,
    FindEnd,
}

/// Folds an ascending id sequence into runs.
///
/// A run that lies wholly below [`FIRST_PRINTABLE_ID`] is dropped; a run that
/// merely starts below it is kept as is.
pub fn extract_ranges(sorted_ids: &[u32]) -> Vec<GlyphRange> {
    let mut ranges = Vec::new();
    let mut next_offset = 0u32;
    let mut emit = |from: u32, length: u32| {
        if from < FIRST_PRINTABLE_ID && from + length <= FIRST_PRINTABLE_ID {
            return;
        }
        ranges.push(GlyphRange {
            from,
            length,
            offset: next_offset,
        });
        next_offset += length;
    };

    let mut state = ScanState::FindBegin;
    let mut from = 0u32;
    let mut last = 0u32;
    let mut idx = 0;
    while idx < sorted_ids.len() {
        let id = sorted_ids[idx];
        match state {
            ScanState::FindBegin => {
                from = id;
                last = id;
                state = ScanState::FindEnd;
                idx += 1;
            }
            ScanState::FindEnd => {
                if last.checked_add(1) == Some(id) {
                    last = id;
                    idx += 1;
                } else {
                    // the gap id starts the next run
                    emit(from, last - from + 1);
                    state = ScanState::FindBegin;
                }
            }
        }
    }
    if state == ScanState::FindEnd {
        emit(from, last - from + 1);
    }
    ranges
}

/// Builds the compressed form of `font`.
///
/// `trim_rects` maps glyph ids to the trimmed area inside each glyph's source
/// rectangle; its left/top corrects the glyph offset. Glyphs without an entry
/// are treated as untrimmed. Glyphs outside every kept run are left out.
pub fn to_basic_font(font: &BitmapFont, trim_rects: &HashMap<u32, Rect>) -> BasicFont {
    let mut chars: Vec<_> = font.chars.iter().collect();
    chars.sort_by_key(|c| c.id);
    let ids: Vec<u32> = chars.iter().map(|c| c.id).collect();
    let ranges = extract_ranges(&ids);

    let in_range = |id: u32| {
        ranges
            .iter()
            .any(|r| id >= r.from && id - r.from < r.length)
    };
    let kernings = chars
        .iter()
        .filter(|c| in_range(c.id))
        .map(|c| {
            let trim = trim_rects.get(&c.id).copied().unwrap_or_default();
            GlyphKerning {
                offset_x: c.offset_px.x + trim.x as i32,
                offset_y: c.offset_px.y + trim.y as i32,
                layout_width: c.x_advance_px,
            }
        })
        .collect();

    BasicFont {
        header: BasicFontHeader {
            name: font.name.clone(),
            dpi: font.dpi,
            size: font.size,
            line_spacing_px: font.line_spacing_px,
            base_line_px: font.base_line_px,
            padding_px: font.padding_px,
            texture_file_name: font.texture_file_name.clone(),
            font_type: font.font_type,
            sdf: font.sdf,
        },
        ranges,
        kernings,
    }
}
