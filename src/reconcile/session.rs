//! Accept/reject reconciliation of one proposed edit against a live buffer.
//!
//! A session owns the pending reviewable blocks from "proposal received"
//! until every group is resolved or the session is cancelled. The live
//! buffer holds the proposed text for the whole review: removed lines exist
//! only as block content and decorations. Accepting a group is therefore
//! pure bookkeeping, while rejecting deletes added ranges and re-inserts
//! removed content at its anchor.
//!
//! Line numbers are renumbered after every operation that changes the line
//! count, before the next operation is processed. The session does not
//! defend against free-form edits made to the buffer while it is open;
//! hosts must keep diff review and direct editing mutually exclusive.

use std::sync::Arc;
use std::time::Instant;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::buffer::{LineRange, TextBuffer};
use super::decorations::{DecorationSink, StyleClass};
use crate::diff::blocks::{DiffBlock, build_blocks};
use crate::diff::engine::{DiffSegmentKind, LineDiff};
use crate::diff::grouping::{DecisionGroup, group_blocks};
use crate::error::PairviewError;
use crate::telemetry::TelemetryLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Reviewing,
    Resolved,
    Cancelled,
}

/// One reconciliation session: the pending block list plus the bookkeeping
/// needed to drive it to resolution.
pub struct ReviewSession {
    id: Uuid,
    proposal_sha256: String,
    blocks: Vec<DiffBlock>,
    cancelled: bool,
    telemetry: Arc<TelemetryLog>,
}

impl ReviewSession {
    /// Open a review of `buffer` (already holding the proposed text) against
    /// `original`. Computes the diff, builds the pending block list, and
    /// draws the initial decorations.
    pub fn open(
        original: &str,
        buffer: &dyn TextBuffer,
        engine: &LineDiff,
        decorations: &mut dyn DecorationSink,
        telemetry: Arc<TelemetryLog>,
    ) -> Self {
        let started = Instant::now();
        let proposed = buffer.text();

        let segments = engine.diff(original, &proposed);
        let blocks: Vec<DiffBlock> = build_blocks(&segments)
            .into_iter()
            .filter(|b| b.kind != DiffSegmentKind::Unchanged)
            .collect();

        let session = ReviewSession {
            id: Uuid::new_v4(),
            proposal_sha256: sha256_hex(proposed.as_bytes()),
            blocks,
            cancelled: false,
            telemetry,
        };

        session.telemetry.log_performance(
            "review_session_open",
            started.elapsed(),
            Some(serde_json::json!({
                "session_id": session.id.to_string(),
                "pending_blocks": session.blocks.len(),
            })),
        );

        session.redraw(decorations);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// SHA-256 of the proposed text captured at open; lets hosts detect
    /// buffer drift before committing a decision.
    pub fn proposal_sha256(&self) -> &str {
        &self.proposal_sha256
    }

    pub fn buffer_matches_proposal(&self, buffer: &dyn TextBuffer) -> bool {
        sha256_hex(buffer.text().as_bytes()) == self.proposal_sha256
    }

    pub fn state(&self) -> SessionState {
        if self.cancelled {
            SessionState::Cancelled
        } else if self.blocks.is_empty() {
            SessionState::Resolved
        } else {
            SessionState::Reviewing
        }
    }

    /// True iff no reviewable blocks remain
    pub fn is_resolved(&self) -> bool {
        !self.cancelled && self.blocks.is_empty()
    }

    pub fn pending_blocks(&self) -> &[DiffBlock] {
        &self.blocks
    }

    /// Decision groups rebuilt from the current pending list
    pub fn groups(&self) -> Vec<DecisionGroup> {
        group_blocks(&self.blocks)
    }

    /// Accept a group: keep the proposed content. Added text is already in
    /// the buffer and removed text is already absent, so the buffer is never
    /// mutated; the group's blocks leave the pending set. Blocks whose ids
    /// are no longer pending are skipped.
    pub fn accept(
        &mut self,
        group: &DecisionGroup,
        decorations: &mut dyn DecorationSink,
    ) -> Result<(), PairviewError> {
        if self.cancelled {
            return Ok(());
        }
        for id in group.block_ids() {
            if let Some(pos) = self.blocks.iter().position(|b| b.id == id) {
                self.blocks.remove(pos);
            }
        }
        self.redraw(decorations);
        Ok(())
    }

    /// Reject a group: restore the original content. Added blocks are
    /// deleted from the buffer and removed blocks are re-inserted at their
    /// anchor; remaining blocks are renumbered after each mutation. A buffer
    /// failure propagates and leaves the failing block pending for retry.
    pub fn reject(
        &mut self,
        group: &DecisionGroup,
        buffer: &mut dyn TextBuffer,
        decorations: &mut dyn DecorationSink,
    ) -> Result<(), PairviewError> {
        if self.cancelled {
            return Ok(());
        }
        // Added blocks leave the buffer before removed content is re-inserted
        // at the same anchor; the reverse order would stitch a terminator onto
        // an unterminated final line.
        for id in group.block_ids().into_iter().rev() {
            let Some(pos) = self.blocks.iter().position(|b| b.id == id) else {
                continue;
            };
            let block = self.blocks[pos].clone();
            let lines = block.line_count();

            match block.kind {
                DiffSegmentKind::Added => {
                    buffer.replace_range(&LineRange::new(block.start_line, block.end_line), "")?;
                    self.blocks.remove(pos);
                    self.shift_up(block.end_line, lines);
                }
                DiffSegmentKind::Removed => {
                    buffer.replace_range(
                        &LineRange::insertion_at(block.start_line),
                        &block.content,
                    )?;
                    self.blocks.remove(pos);
                    self.shift_down(block.start_line, lines);
                }
                DiffSegmentKind::Unchanged => {
                    // Unchanged blocks are never pending
                    self.blocks.remove(pos);
                }
            }
        }
        self.redraw(decorations);
        Ok(())
    }

    /// Discard all pending blocks and decorations without further buffer
    /// mutation. Decisions already applied stay applied.
    pub fn cancel(&mut self, decorations: &mut dyn DecorationSink) {
        self.blocks.clear();
        self.cancelled = true;
        if let Err(e) = decorations.clear_styles() {
            self.telemetry.log_error(
                &e,
                Some(serde_json::json!({
                    "session_id": self.id.to_string(),
                    "operation": "cancel",
                })),
            );
        }
    }

    /// Redraw decorations from the pending list. Styling failures are logged
    /// and swallowed; text correctness never depends on the renderer.
    fn redraw(&self, decorations: &mut dyn DecorationSink) {
        let styles: Vec<(LineRange, StyleClass)> = self
            .blocks
            .iter()
            .map(|b| {
                let class = match b.kind {
                    DiffSegmentKind::Removed => StyleClass::RemovedLine,
                    _ => StyleClass::AddedLine,
                };
                (LineRange::new(b.start_line, b.end_line), class)
            })
            .collect();

        let applied = decorations
            .clear_styles()
            .and_then(|_| decorations.apply_range_styles(&styles));
        if let Err(e) = applied {
            self.telemetry.log_error(
                &e,
                Some(serde_json::json!({
                    "session_id": self.id.to_string(),
                    "operation": "redraw",
                })),
            );
        }
    }

    /// Shift blocks positioned after a deleted range up by `amount` lines
    fn shift_up(&mut self, after_line: u32, amount: u32) {
        for block in &mut self.blocks {
            if block.start_line > after_line {
                block.start_line -= amount;
                block.end_line -= amount;
            }
        }
    }

    /// Shift blocks at or after an insertion anchor down by `amount` lines
    fn shift_down(&mut self, from_line: u32, amount: u32) {
        for block in &mut self.blocks {
            if block.start_line >= from_line {
                block.start_line += amount;
                block.end_line += amount;
            }
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
