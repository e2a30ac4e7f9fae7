//! Loading pre-parsed coverage blocks.
//!
//! Profile producers hand over a JSON array of files, each with its blocks:
//!
//! ```json
//! [{"path": "pkg/a.go", "blocks": [{"start_line": 1, "end_line": 3, "statements": 2, "count": 5}]}]
//! ```
//!
//! Block ranges are checked here once so the tree and annotator can trust them.
use std::io::Read;
use std::path::Path;

use crate::error::{CovtreeError, Result};
use crate::model::FileBlocks;

/// Read and validate a profile from any reader.
pub fn load<R: Read>(reader: R) -> Result<Vec<FileBlocks>> {
    let files: Vec<FileBlocks> = serde_json::from_reader(reader)?;
    for file in &files {
        validate(file)?;
    }
    Ok(files)
}

/// Read and validate a profile file from disk.
pub fn load_file(path: &Path) -> Result<Vec<FileBlocks>> {
    let file = std::fs::File::open(path)?;
    load(std::io::BufReader::new(file))
}

fn validate(file: &FileBlocks) -> Result<()> {
    for block in &file.blocks {
        if block.start_line == 0 {
            return Err(CovtreeError::Profile(format!(
                "{}: block starts at line 0",
                file.path
            )));
        }
        if block.end_line < block.start_line {
            return Err(CovtreeError::Profile(format!(
                "{}: block ends at line {} before it starts at line {}",
                file.path, block.end_line, block.start_line
            )));
        }
    }
    Ok(())
}
