use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

/// Tracks license files that must travel with resolved sources.
///
/// Resolution calls this once per source directory it touches; how missing
/// licenses are treated is up to the implementation.
pub trait LicenseCopyManager {
    fn resolve_license_files(&mut self, source_dir: &Path, dst_dir: &Path) -> Result<()>;
}

/// A license file found next to a source and the destination it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub license_file: PathBuf,
    pub dst_dir: PathBuf,
}

/// Records license files instead of copying them; the writer stage copies later.
#[derive(Debug, Clone)]
pub struct LicenseRecorder {
    file_names: Vec<String>,
    visited: HashSet<(PathBuf, PathBuf)>,
    records: Vec<LicenseRecord>,
}

impl Default for LicenseRecorder {
    fn default() -> Self {
        Self::new(["License.json", "LICENSE", "LICENSE.txt"])
    }
}

impl LicenseRecorder {
    pub fn new<I, S>(file_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            file_names: file_names.into_iter().map(Into::into).collect(),
            visited: HashSet::new(),
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[LicenseRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<LicenseRecord> {
        self.records
    }
}

impl LicenseCopyManager for LicenseRecorder {
    fn resolve_license_files(&mut self, source_dir: &Path, dst_dir: &Path) -> Result<()> {
        if !self
            .visited
            .insert((source_dir.to_path_buf(), dst_dir.to_path_buf()))
        {
            return Ok(());
        }
        let found = self
            .file_names
            .iter()
            .map(|name| source_dir.join(name))
            .find(|candidate| candidate.is_file());
        match found {
            Some(license_file) => {
                debug!(?license_file, ?dst_dir, "license recorded");
                self.records.push(LicenseRecord {
                    license_file,
                    dst_dir: dst_dir.to_path_buf(),
                });
            }
            None => debug!(?source_dir, "no license file"),
        }
        Ok(())
    }
}
