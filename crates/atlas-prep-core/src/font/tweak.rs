use tracing::debug;

use super::{BitmapFont, BitmapFontTweakConfig, SdfFontConfig, narrow};
use crate::error::{AtlasPrepError, Result};

/// Applies baseline / line spacing adjustments and validates the measure char.
///
/// Returns an unchanged copy when nothing is requested. A baseline change
/// shifts every glyph's vertical offset by the same delta so rendered text
/// stays where it was relative to the new baseline.
pub fn tweak(
    font: &BitmapFont,
    config: &BitmapFontTweakConfig,
    sdf: Option<&SdfFontConfig>,
    trace: &super::TraceInfo,
) -> Result<BitmapFont> {
    if config.is_noop() && sdf.is_none() {
        return Ok(font.clone());
    }

    let mut sdf_params = font.sdf;
    if let Some(cfg) = sdf {
        // a zero spread keeps what the source format declared
        if cfg.spread > 0.0 {
            sdf_params.spread = cfg.spread;
        }
        sdf_params.desired_base_line_px = cfg.desired_base_line_px;
    }

    let mut delta: i32 = 0;
    let mut base_line_px = font.base_line_px;
    let mut line_spacing_px = font.line_spacing_px;
    if config.base_line_px != 0 {
        delta = i32::from(config.base_line_px) - i32::from(font.base_line_px);
        base_line_px = config.base_line_px;
        line_spacing_px = narrow(
            "line spacing",
            i64::from(font.line_spacing_px) + i64::from(delta),
        )?;
    }
    if config.line_spacing_px != 0 {
        line_spacing_px = config.line_spacing_px;
    }

    if config.measure_char_id != 0 {
        let measured = font
            .find_char(config.measure_char_id)
            .ok_or_else(|| AtlasPrepError::NotFound {
                char_id: config.measure_char_id,
                trace: trace.to_string(),
            })?;
        if measured.src_rect_px.h != u32::from(config.measure_height_px) {
            return Err(AtlasPrepError::MeasureHeightMismatch {
                char_id: config.measure_char_id,
                expected: config.measure_height_px,
                actual: measured.src_rect_px.h,
                trace: trace.to_string(),
            });
        }
    }

    debug!(
        font = %font.name,
        delta,
        base_line_px,
        line_spacing_px,
        "font tweaked"
    );

    let mut out = font.clone();
    out.base_line_px = base_line_px;
    out.line_spacing_px = line_spacing_px;
    out.sdf = sdf_params;
    for c in &mut out.chars {
        c.offset_px.y += delta;
    }
    Ok(out)
}
