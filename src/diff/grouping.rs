//! Grouping of adjacent reviewable blocks into decision units.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::blocks::DiffBlock;
use super::engine::DiffSegmentKind;

/// A contiguous cluster of reviewable blocks presented to the user as one
/// accept/reject decision. Rebuilt from scratch from the current block list
/// whenever decorations are reapplied; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionGroup {
    blocks: Vec<DiffBlock>,
}

impl DecisionGroup {
    fn new(blocks: Vec<DiffBlock>) -> Self {
        debug_assert!(!blocks.is_empty());
        DecisionGroup { blocks }
    }

    pub fn blocks(&self) -> &[DiffBlock] {
        &self.blocks
    }

    pub fn block_ids(&self) -> Vec<Uuid> {
        self.blocks.iter().map(|b| b.id).collect()
    }

    pub fn start_line(&self) -> u32 {
        self.blocks[0].start_line
    }

    pub fn end_line(&self) -> u32 {
        self.blocks.iter().map(|b| b.end_line).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Chain consecutive reviewable blocks into maximal contiguous groups.
///
/// Unchanged blocks are filtered out first. A block joins the current group
/// when its start is within one line of the group's last block; otherwise it
/// opens a new group. Single pass, stable with respect to input order.
pub fn group_blocks(blocks: &[DiffBlock]) -> Vec<DecisionGroup> {
    let mut groups: Vec<DecisionGroup> = Vec::new();
    let mut current: Vec<DiffBlock> = Vec::new();

    for block in blocks
        .iter()
        .filter(|b| b.kind != DiffSegmentKind::Unchanged)
    {
        match current.last() {
            Some(last) if block.start_line <= last.end_line + 1 => {
                current.push(block.clone());
            }
            Some(_) => {
                groups.push(DecisionGroup::new(std::mem::take(&mut current)));
                current.push(block.clone());
            }
            None => {
                current.push(block.clone());
            }
        }
    }

    if !current.is_empty() {
        groups.push(DecisionGroup::new(current));
    }

    groups
}
