use serde::{Deserialize, Serialize};

use crate::error::{AtlasPrepError, Result};
use crate::path::ResolvedPath;

/// What a filename says about the image it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilenameInfo {
    /// File name without extension, patch marker and (optionally) dpi suffix.
    pub normalized_name: String,
    /// Dpi encoded in the filename, 0 when none.
    pub dpi: u16,
    pub is_patch: bool,
}

/// Extracts naming conventions from image filenames.
pub trait FilenameAnalyzer {
    fn analyze(&self, path: &ResolvedPath, keep_dpi_in_filename: bool) -> Result<FilenameInfo>;
}

/// Default conventions: `name_160dpi.png` encodes dpi 160, `name.9.png` marks a 9-patch.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionFilenameAnalyzer;

const PATCH_SUFFIX: &str = ".9";
const DPI_SUFFIX: &str = "dpi";

impl FilenameAnalyzer for ConventionFilenameAnalyzer {
    fn analyze(&self, path: &ResolvedPath, keep_dpi_in_filename: bool) -> Result<FilenameInfo> {
        let mut name = path.file_stem();

        let is_patch = name.len() > PATCH_SUFFIX.len() && name.ends_with(PATCH_SUFFIX);
        if is_patch {
            name = &name[..name.len() - PATCH_SUFFIX.len()];
        }

        let (base, dpi) = split_dpi_suffix(name, path)?;
        let normalized_name = if keep_dpi_in_filename || dpi == 0 {
            name.to_string()
        } else {
            base.to_string()
        };
        if normalized_name.is_empty() {
            return Err(AtlasPrepError::InvalidPath {
                path: path.absolute_path().to_string(),
                reason: "filename has no name part".into(),
            });
        }
        Ok(FilenameInfo {
            normalized_name,
            dpi,
            is_patch,
        })
    }
}

/// Splits `name_160dpi` into (`name`, 160). Returns (name, 0) when no suffix is present.
fn split_dpi_suffix<'a>(name: &'a str, path: &ResolvedPath) -> Result<(&'a str, u16)> {
    let lower = name.to_ascii_lowercase();
    let Some(without_dpi) = lower.strip_suffix(DPI_SUFFIX) else {
        return Ok((name, 0));
    };
    let Some(underscore) = without_dpi.rfind('_') else {
        return Ok((name, 0));
    };
    let digits = &without_dpi[underscore + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok((name, 0));
    }
    let value: u64 = digits.parse().map_err(|_| AtlasPrepError::ValueOutOfRange {
        field: "filename dpi",
        value: i64::MAX,
    })?;
    let dpi = u16::try_from(value).map_err(|_| AtlasPrepError::ValueOutOfRange {
        field: "filename dpi",
        value: value as i64,
    })?;
    if dpi == 0 {
        return Err(AtlasPrepError::InvalidPath {
            path: path.absolute_path().to_string(),
            reason: "filename dpi can not be 0".into(),
        });
    }
    Ok((&name[..underscore], dpi))
}
