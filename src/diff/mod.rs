pub mod blocks;
pub mod engine;
pub mod grouping;

pub use blocks::{DiffBlock, build_blocks};
pub use engine::{DiffSegment, DiffSegmentKind, LineDiff};
pub use grouping::{DecisionGroup, group_blocks};
