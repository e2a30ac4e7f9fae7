use serde::Serialize;

use crate::model::Block;

/// Coverage state of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "count", rename_all = "snake_case")]
pub enum LineAnnotation {
    NotInstrumented,
    Covered(u64),
    Uncovered,
}

impl LineAnnotation {
    pub fn css_class(&self) -> &'static str {
        match self {
            LineAnnotation::NotInstrumented => "",
            LineAnnotation::Covered(_) => "covered",
            LineAnnotation::Uncovered => "uncovered",
        }
    }
}

/// Annotate lines `1..=line_count` from a file's blocks in one forward pass.
///
/// `blocks` must be sorted by start line and must not overlap. Unsorted input
/// is not detected and yields wrong annotations.
#[must_use]
pub fn annotate(line_count: usize, blocks: &[Block]) -> Vec<LineAnnotation> {
    let mut annotations = Vec::with_capacity(line_count);
    let mut idx = 0;

    for line in (1..=line_count).map(|n| u32::try_from(n).unwrap_or(u32::MAX)) {
        while idx < blocks.len() && blocks[idx].end_line < line {
            idx += 1;
        }

        let annotation = match blocks.get(idx) {
            Some(block) if block.contains(line) => {
                if block.count > 0 {
                    LineAnnotation::Covered(block.count)
                } else {
                    LineAnnotation::Uncovered
                }
            }
            _ => LineAnnotation::NotInstrumented,
        };
        annotations.push(annotation);
    }

    annotations
}
