//! Access to the source text of reported files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{CovtreeError, Result};
use crate::tree::SourceFile;

/// Every source backend implements this trait.
pub trait SourceReader {
    /// Return the full text of `file`. Failing here aborts the report.
    fn read(&self, file: &SourceFile) -> Result<String>;
}

/// Reads sources from disk.
///
/// Absolute profile paths are read as-is; anything else is resolved against
/// `base` using the file's root-relative path.
#[derive(Debug, Clone)]
pub struct FsSourceReader {
    pub base: PathBuf,
}

impl FsSourceReader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn resolve(&self, file: &SourceFile) -> PathBuf {
        let reported = Path::new(&file.path);
        if reported.is_absolute() {
            reported.to_path_buf()
        } else {
            self.base.join(&file.relative_path)
        }
    }
}

impl SourceReader for FsSourceReader {
    fn read(&self, file: &SourceFile) -> Result<String> {
        let path = self.resolve(file);
        let bytes = std::fs::read(&path).map_err(|source| CovtreeError::SourceUnreadable {
            path: path.display().to_string(),
            source,
        })?;
        // undecodable bytes become U+FFFD
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// In-memory sources keyed by root-relative path.
impl SourceReader for HashMap<String, String> {
    fn read(&self, file: &SourceFile) -> Result<String> {
        self.get(&file.relative_path)
            .cloned()
            .ok_or_else(|| CovtreeError::SourceUnreadable {
                path: file.relative_path.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}
