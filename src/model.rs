//! Plain coverage records shared by every stage: the blocks handed over by a
//! profile producer and the statement counts rolled up through the tree.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Compute a coverage percentage, returning 0.0 when the total is zero.
#[must_use]
pub fn percentage(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}

/// A contiguous, inclusive range of source lines with one execution count.
///
/// Producers guarantee `start_line >= 1` and `end_line >= start_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub start_line: u32,
    pub end_line: u32,
    /// Number of statements the block stands for.
    pub statements: u32,
    /// How many times the block was executed.
    pub count: u64,
}

impl Block {
    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// Blocks for one source file as delivered by the profile producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileBlocks {
    pub path: String,
    pub blocks: Vec<Block>,
}

impl FileBlocks {
    pub fn new(path: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            path: path.into(),
            blocks,
        }
    }
}

/// Statement totals for a file or directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub statements: u64,
    pub covered: u64,
}

impl Counts {
    /// Totals for a single file's blocks.
    #[must_use]
    pub fn from_blocks(blocks: &[Block]) -> Self {
        blocks.iter().fold(Self::default(), |mut acc, block| {
            let statements = u64::from(block.statements);
            acc.statements += statements;
            if block.count > 0 {
                acc.covered += statements;
            }
            acc
        })
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        percentage(self.covered, self.statements)
    }
}

impl Add for Counts {
    type Output = Counts;

    fn add(self, rhs: Counts) -> Counts {
        Counts {
            statements: self.statements + rhs.statements,
            covered: self.covered + rhs.covered,
        }
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, rhs: Counts) {
        *self = *self + rhs;
    }
}
