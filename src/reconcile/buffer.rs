//! Buffer access contract between the reconciliation core and the hosting
//! editor surface, plus an in-memory implementation for tests and headless
//! hosts.

use serde::{Deserialize, Serialize};

use crate::diff::engine::split_lines;
use crate::error::PairviewError;

/// A line range, 1-indexed and inclusive on both ends.
/// `start > end` denotes an empty range anchored before `start` — the
/// insertion-point encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn new(start: u32, end: u32) -> Self {
        LineRange { start, end }
    }

    /// Empty range anchored before `line` (1-indexed; `line_count + 1`
    /// anchors past the final line).
    pub fn insertion_at(line: u32) -> Self {
        debug_assert!(line >= 1);
        LineRange {
            start: line,
            end: line - 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn line_count(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            self.end - self.start + 1
        }
    }
}

/// The narrow buffer interface the reconciliation core requires from its
/// hosting editor. Out-of-range operations return a typed error, never panic.
pub trait TextBuffer {
    fn text(&self) -> String;
    fn line_count(&self) -> u32;
    fn full_range(&self) -> LineRange;
    fn text_in_range(&self, range: &LineRange) -> Result<String, PairviewError>;
    /// Replace `range` with `text`. An empty range inserts before its anchor
    /// line; empty text deletes the range including trailing newlines.
    fn replace_range(&mut self, range: &LineRange, text: &str) -> Result<(), PairviewError>;
}

/// String-backed buffer
#[derive(Debug, Clone, Default)]
pub struct StringBuffer {
    content: String,
}

impl StringBuffer {
    pub fn new(content: impl Into<String>) -> Self {
        StringBuffer {
            content: content.into(),
        }
    }

    fn check_range(&self, range: &LineRange, line_count: u32) -> Result<(), PairviewError> {
        let out_of_bounds = if range.is_empty() {
            range.start < 1 || range.start > line_count + 1
        } else {
            range.start < 1 || range.end > line_count
        };
        if out_of_bounds {
            return Err(PairviewError::BufferRange {
                start: range.start,
                end: range.end,
                line_count,
            });
        }
        Ok(())
    }
}

impl TextBuffer for StringBuffer {
    fn text(&self) -> String {
        self.content.clone()
    }

    fn line_count(&self) -> u32 {
        split_lines(&self.content).len() as u32
    }

    fn full_range(&self) -> LineRange {
        let count = self.line_count();
        if count == 0 {
            LineRange::insertion_at(1)
        } else {
            LineRange::new(1, count)
        }
    }

    fn text_in_range(&self, range: &LineRange) -> Result<String, PairviewError> {
        let lines = split_lines(&self.content);
        self.check_range(range, lines.len() as u32)?;
        if range.is_empty() {
            return Ok(String::new());
        }
        Ok(lines[(range.start - 1) as usize..range.end as usize].concat())
    }

    fn replace_range(&mut self, range: &LineRange, text: &str) -> Result<(), PairviewError> {
        let lines = split_lines(&self.content);
        self.check_range(range, lines.len() as u32)?;

        let prefix_end = (range.start - 1) as usize;
        let suffix_start = if range.is_empty() {
            prefix_end
        } else {
            range.end as usize
        };

        let mut rebuilt = lines[..prefix_end].concat();
        let has_tail = !text.is_empty() || suffix_start < lines.len();
        if has_tail && !rebuilt.is_empty() && !rebuilt.ends_with('\n') {
            // The previous final line gains a terminator when content follows it
            rebuilt.push('\n');
        }
        rebuilt.push_str(text);
        if suffix_start < lines.len() {
            if !text.is_empty() && !text.ends_with('\n') {
                rebuilt.push('\n');
            }
            rebuilt.push_str(&lines[suffix_start..].concat());
        }

        self.content = rebuilt;
        Ok(())
    }
}
