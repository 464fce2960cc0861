//! Line-level diff computation between an original and a proposed buffer.
//!
//! Segments classify maximal runs of lines as added, removed, or unchanged,
//! in the exact order the LCS alignment produces them.

use serde::{Deserialize, Serialize};
use similar::{DiffOp, capture_diff_slices};

use crate::config::DiffConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffSegmentKind {
    Added,
    Removed,
    Unchanged,
}

/// A maximal run of lines sharing one classification.
/// Text retains line terminators; the final line of a buffer may lack one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub text: String,
    pub kind: DiffSegmentKind,
}

impl DiffSegment {
    pub fn new(text: String, kind: DiffSegmentKind) -> Self {
        DiffSegment { text, kind }
    }

    /// Number of lines this segment covers. A trailing newline does not
    /// produce a phantom empty line.
    pub fn line_count(&self) -> u32 {
        split_lines(&self.text).len() as u32
    }
}

/// Split into lines keeping terminators: `"a\nb\n"` is two lines, `""` is zero.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split_inclusive('\n').collect()
}

/// Line diff engine over two full buffer snapshots
pub struct LineDiff {
    config: DiffConfig,
}

impl LineDiff {
    pub fn new() -> Self {
        LineDiff {
            config: DiffConfig::default(),
        }
    }

    pub fn with_config(config: DiffConfig) -> Self {
        LineDiff { config }
    }

    /// Compute the ordered segment sequence between `original` and `modified`.
    ///
    /// Empty inputs are valid: both empty yields no segments; one empty yields
    /// a single segment covering the other buffer. Replacements surface as a
    /// Removed segment immediately followed by an Added segment.
    pub fn diff(&self, original: &str, modified: &str) -> Vec<DiffSegment> {
        let old_lines = split_lines(original);
        let new_lines = split_lines(modified);

        let ops = capture_diff_slices(self.config.algorithm.to_similar(), &old_lines, &new_lines);

        let mut segments = Vec::new();
        for op in ops {
            match op {
                DiffOp::Equal { old_index, len, .. } => {
                    if len > 0 {
                        segments.push(DiffSegment::new(
                            old_lines[old_index..old_index + len].concat(),
                            DiffSegmentKind::Unchanged,
                        ));
                    }
                }
                DiffOp::Delete {
                    old_index, old_len, ..
                } => {
                    if old_len > 0 {
                        segments.push(DiffSegment::new(
                            old_lines[old_index..old_index + old_len].concat(),
                            DiffSegmentKind::Removed,
                        ));
                    }
                }
                DiffOp::Insert {
                    new_index, new_len, ..
                } => {
                    if new_len > 0 {
                        segments.push(DiffSegment::new(
                            new_lines[new_index..new_index + new_len].concat(),
                            DiffSegmentKind::Added,
                        ));
                    }
                }
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => {
                    // A same-position replacement stays two segments; the
                    // grouping stage merges them into one review unit.
                    if old_len > 0 {
                        segments.push(DiffSegment::new(
                            old_lines[old_index..old_index + old_len].concat(),
                            DiffSegmentKind::Removed,
                        ));
                    }
                    if new_len > 0 {
                        segments.push(DiffSegment::new(
                            new_lines[new_index..new_index + new_len].concat(),
                            DiffSegmentKind::Added,
                        ));
                    }
                }
            }
        }

        segments
    }
}

impl Default for LineDiff {
    fn default() -> Self {
        Self::new()
    }
}
