//! Path normalization shared by every command.
//!
//! Paths are kept as forward-slash strings so atlas names and error messages
//! look the same on every host.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AtlasPrepError, Result};

const INVALID_PATH_CHARS: &[char] = &[':', '*', '?', '"', '<', '>', '|'];

/// An absolute, normalized path together with the relative string it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedPath {
    absolute_path: String,
    unresolved_source_path: String,
    parent_path: String,
}

impl ResolvedPath {
    /// Normalized absolute path (forward slashes, never empty).
    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }
    /// The relative string as written in the command.
    pub fn unresolved_source_path(&self) -> &str {
        &self.unresolved_source_path
    }
    /// The base the relative string was resolved against.
    pub fn parent_path(&self) -> &str {
        &self.parent_path
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.absolute_path)
    }

    /// Directory containing this path.
    pub fn directory(&self) -> &str {
        match self.absolute_path.rfind('/') {
            Some(0) => "/",
            Some(idx) => &self.absolute_path[..idx],
            None => "",
        }
    }

    pub fn file_name(&self) -> &str {
        match self.absolute_path.rfind('/') {
            Some(idx) => &self.absolute_path[idx + 1..],
            None => &self.absolute_path,
        }
    }

    /// File name without its last extension.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) if idx > 0 => Some(&name[idx + 1..]),
            _ => None,
        }
    }

    /// Directory part of the unresolved relative path ("" at the root).
    pub fn unresolved_directory(&self) -> &str {
        match self.unresolved_source_path.rfind('/') {
            Some(idx) => &self.unresolved_source_path[..idx],
            None => "",
        }
    }
}

/// Combines base directories with relative command paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl PathResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves `relative` against `base`.
    ///
    /// `relative` must be a valid relative path that stays inside `base`.
    /// A path that normalizes to nothing (`""`, `"."`) names `base` itself.
    pub fn combine(&self, base: &Path, relative: &str) -> Result<ResolvedPath> {
        self.join(base, relative, true)
    }

    /// Resolves a path discovered on disk below `base`.
    ///
    /// Only normalization and the escape check apply; names the host
    /// filesystem accepts are kept even when a command could not spell them.
    pub fn combine_discovered(&self, base: &Path, relative: &str) -> Result<ResolvedPath> {
        self.join(base, relative, false)
    }

    fn join(&self, base: &Path, relative: &str, check_grammar: bool) -> Result<ResolvedPath> {
        if base.as_os_str().is_empty() {
            return Err(AtlasPrepError::InvalidPath {
                path: String::new(),
                reason: "base path is empty".into(),
            });
        }
        let base = std::path::absolute(base)?;
        let parent = normalize_absolute(&to_forward_slashes(&base.to_string_lossy()));
        if parent.is_empty() {
            return Err(AtlasPrepError::InvalidPath {
                path: base.display().to_string(),
                reason: "base path is empty".into(),
            });
        }
        let rel = normalize_relative(relative).map_err(|_| AtlasPrepError::PathEscapesRoot {
            path: relative.to_string(),
            root: parent.clone(),
        })?;
        // "" and "." name the base; a rooted path never does
        if check_grammar && (!rel.is_empty() || relative.starts_with(['/', '\\'])) {
            validate_relative_path(relative)?;
        }
        let absolute_path = if rel.is_empty() {
            parent.clone()
        } else if parent.ends_with('/') {
            format!("{parent}{rel}")
        } else {
            format!("{parent}/{rel}")
        };
        Ok(ResolvedPath {
            absolute_path,
            unresolved_source_path: rel,
            parent_path: parent,
        })
    }
}

pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Checks the path-name grammar for command paths: non-empty, relative,
/// no reserved characters and no `..` that climbs above the start.
pub fn validate_relative_path(path: &str) -> Result<()> {
    let invalid = |reason: &str| AtlasPrepError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };
    if path.trim().is_empty() {
        return Err(invalid("path can not be empty"));
    }
    let fwd = to_forward_slashes(path);
    if fwd.starts_with('/') {
        return Err(invalid("path must be relative"));
    }
    if let Some(c) = fwd
        .chars()
        .find(|c| INVALID_PATH_CHARS.contains(c) || c.is_control())
    {
        return Err(invalid(&format!("invalid character {c:?}")));
    }
    normalize_relative(&fwd).map(|_| ())
}

/// Normalizes a relative path: forward slashes, no empty or `.` segments,
/// `..` folded into its parent, no leading `/`.
/// Fails when `..` would climb above the start.
pub fn normalize_relative(path: &str) -> Result<String> {
    let fwd = to_forward_slashes(path);
    let mut parts: Vec<&str> = Vec::new();
    for seg in fwd.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(AtlasPrepError::InvalidPath {
                        path: path.to_string(),
                        reason: "path climbs above its root".into(),
                    });
                }
            }
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

/// Lexically normalizes an absolute (or rooted) path, keeping its root.
pub fn normalize_absolute(path: &str) -> String {
    let fwd = to_forward_slashes(path);
    let rooted = fwd.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for seg in fwd.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if rooted {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Joins two already-normalized relative paths ("" is the root).
pub fn join_relative(dir: &str, name: &str) -> String {
    match (dir.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => dir.to_string(),
        (false, false) => format!("{dir}/{name}"),
    }
}
