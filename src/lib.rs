//! Diff reconciliation and coding-behavior capture for live interview
//! editing surfaces.
//!
//! The crate has two independent cores attached to one editable buffer:
//!
//! - **Reconciliation**: a proposed full-text replacement is diffed against
//!   the original at line granularity, turned into addressable blocks and
//!   contiguous decision groups, and accepted or rejected group by group
//!   until nothing is pending ([`reconcile::ReviewSession`]).
//! - **Behavior capture**: live edit events are classified into typed,
//!   timestamped actions with idle detection, compacted by a pure merge
//!   pass, and optionally persisted for analytics
//!   ([`recorder::ActionRecorder`]).
//!
//! Rendering, transport, and the AI backend stay behind the narrow traits in
//! [`reconcile::buffer`], [`reconcile::decorations`], and
//! [`recorder::events`].

pub mod config;
pub mod diff;
pub mod error;
pub mod reconcile;
pub mod recorder;
pub mod telemetry;

pub use config::{DiffAlgorithm, DiffConfig, RecorderConfig};
pub use diff::{DecisionGroup, DiffBlock, DiffSegment, DiffSegmentKind, LineDiff};
pub use error::PairviewError;
pub use reconcile::{LineRange, ReviewSession, SessionState, StringBuffer, TextBuffer};
pub use recorder::{ActionKind, ActionRecorder, ActionStore, CodingAction, EditorEvent, EventHub};
pub use telemetry::TelemetryLog;
