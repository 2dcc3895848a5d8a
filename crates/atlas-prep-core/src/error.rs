use thiserror::Error;

use crate::font::BitmapFontType;

#[derive(Debug, Error)]
pub enum AtlasPrepError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory scan error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("Path '{path}' escapes its root '{root}'")]
    PathEscapesRoot { path: String, root: String },
    #[error("Duplicate {kind} key '{key}'")]
    DuplicateModKey { kind: &'static str, key: String },
    #[error("Conflicting image modifiers: {0}")]
    ConflictingModifiers(String),
    #[error("Conflicting dpi for '{path}': command requested {explicit}, filename encodes {filename}")]
    ConflictingDpi {
        path: String,
        explicit: u16,
        filename: u16,
    },
    #[error("{}", unused_mods_message(folder_mods, file_mods))]
    UnusedMods {
        folder_mods: Vec<String>,
        file_mods: Vec<String>,
    },
    #[error("Unsupported font '{name}': {reason}")]
    UnsupportedFont { name: String, reason: String },
    #[error("Value {value} of '{field}' is out of range")]
    ValueOutOfRange { field: &'static str, value: i64 },
    #[error("Unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },
    #[error("Font '{font}' defines char {char_id} more than once")]
    DuplicateChar { font: String, char_id: u32 },
    #[error("Font type mismatch: expected {expected:?}, font is {actual:?}")]
    FontTypeMismatch {
        expected: BitmapFontType,
        actual: BitmapFontType,
    },
    #[error("Measure char {char_id} not found ({trace})")]
    NotFound { char_id: u32, trace: String },
    #[error("Measure char {char_id} is {actual}px high, expected {expected}px ({trace})")]
    MeasureHeightMismatch {
        char_id: u32,
        expected: u16,
        actual: u32,
        trace: String,
    },
    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

fn unused_mods_message(folder_mods: &[String], file_mods: &[String]) -> String {
    let mut parts = Vec::new();
    if !folder_mods.is_empty() {
        parts.push(format!("unused folder mods: {}", folder_mods.join(", ")));
    }
    if !file_mods.is_empty() {
        parts.push(format!("unused file mods: {}", file_mods.join(", ")));
    }
    format!("Override(s) matched no file ({})", parts.join("; "))
}

pub type Result<T> = std::result::Result<T, AtlasPrepError>;
