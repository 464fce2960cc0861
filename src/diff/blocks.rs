//! Addressable diff blocks built from the raw segment sequence.
//!
//! Line numbers are relative to the target (proposed) buffer and both bounds
//! are inclusive, 1-indexed. Removed blocks are anchored at their point of
//! deletion without advancing the numbering, so a replacement appears as a
//! Removed block and an Added block claiming the same position.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::engine::{DiffSegment, DiffSegmentKind, split_lines};

/// The atomic unit of review: a line-ranged run of added, removed, or
/// unchanged content. Identity is stable across renumbering; only the
/// line range shifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffBlock {
    pub id: Uuid,
    /// Line number where this block starts (inclusive, 1-indexed)
    pub start_line: u32,
    /// Line number where this block ends (inclusive, 1-indexed)
    pub end_line: u32,
    pub content: String,
    pub kind: DiffSegmentKind,
}

impl DiffBlock {
    pub fn new(start_line: u32, end_line: u32, content: String, kind: DiffSegmentKind) -> Self {
        DiffBlock {
            id: Uuid::new_v4(),
            start_line,
            end_line,
            content,
            kind,
        }
    }

    /// Returns the number of lines this block covers
    pub fn line_count(&self) -> u32 {
        if self.start_line > self.end_line {
            0
        } else {
            self.end_line - self.start_line + 1
        }
    }

    /// Checks if this block covers no lines
    pub fn is_empty(&self) -> bool {
        self.start_line > self.end_line
    }

    /// Checks if this block overlaps with a given line range (inclusive)
    pub fn overlaps(&self, start_line: u32, end_line: u32) -> bool {
        self.start_line <= end_line && self.end_line >= start_line
    }

    /// Returns the overlapping portion of this block with a given line range
    pub fn intersection(&self, start_line: u32, end_line: u32) -> Option<(u32, u32)> {
        let overlap_start = self.start_line.max(start_line);
        let overlap_end = self.end_line.min(end_line);

        if overlap_start <= overlap_end {
            Some((overlap_start, overlap_end))
        } else {
            None
        }
    }
}

/// Convert a segment sequence into addressable blocks.
///
/// The cursor tracks target numbering: Unchanged and Added segments advance
/// it, Removed segments claim the current position without advancing.
/// Adjacent segments of identical kind collapse into one block.
pub fn build_blocks(segments: &[DiffSegment]) -> Vec<DiffBlock> {
    let mut blocks: Vec<DiffBlock> = Vec::new();
    let mut cursor: u32 = 1;

    for segment in segments {
        let lines = segment.line_count();
        if lines == 0 {
            continue;
        }

        let start = cursor;
        let end = start + lines - 1;
        if segment.kind != DiffSegmentKind::Removed {
            cursor += lines;
        }

        if let Some(last) = blocks.last_mut() {
            if last.kind == segment.kind && start <= last.end_line + 1 {
                last.content.push_str(&segment.text);
                last.end_line = last.start_line + split_lines(&last.content).len() as u32 - 1;
                continue;
            }
        }

        blocks.push(DiffBlock::new(start, end, segment.text.clone(), segment.kind));
    }

    blocks
}
