#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;

use covtree::model::{Block, FileBlocks};

pub fn block(start_line: u32, end_line: u32, statements: u32, count: u64) -> Block {
    Block {
        start_line,
        end_line,
        statements,
        count,
    }
}

pub fn file(path: &str, blocks: Vec<Block>) -> FileBlocks {
    FileBlocks::new(path, blocks)
}

/// In-memory sources keyed by root-relative path.
pub fn sources(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(path, text)| (path.to_string(), text.to_string()))
        .collect()
}

/// Write source files below `dir`, creating parent directories as needed.
pub fn write_sources(dir: &Path, entries: &[(&str, &str)]) {
    for (path, text) in entries {
        let full = dir.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, text).unwrap();
    }
}
