//! Decoration sink contract: purely cosmetic range styling applied by the
//! hosting editor. Nothing in the core depends on successful rendering.

use serde::{Deserialize, Serialize};

use super::buffer::LineRange;
use crate::error::PairviewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleClass {
    AddedLine,
    RemovedLine,
}

/// Range styling interface satisfied by any editor widget capable of
/// per-range styling with line coordinates.
pub trait DecorationSink {
    fn apply_range_styles(&mut self, styles: &[(LineRange, StyleClass)])
    -> Result<(), PairviewError>;
    fn clear_styles(&mut self) -> Result<(), PairviewError>;
}

/// Discards all styling requests
#[derive(Debug, Default)]
pub struct NullDecorationSink;

impl DecorationSink for NullDecorationSink {
    fn apply_range_styles(
        &mut self,
        _styles: &[(LineRange, StyleClass)],
    ) -> Result<(), PairviewError> {
        Ok(())
    }

    fn clear_styles(&mut self) -> Result<(), PairviewError> {
        Ok(())
    }
}

/// Records applied styles for assertions in tests and headless hosts
#[derive(Debug, Default)]
pub struct MemoryDecorationSink {
    pub styles: Vec<(LineRange, StyleClass)>,
    pub clear_count: usize,
}

impl MemoryDecorationSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DecorationSink for MemoryDecorationSink {
    fn apply_range_styles(
        &mut self,
        styles: &[(LineRange, StyleClass)],
    ) -> Result<(), PairviewError> {
        self.styles.extend_from_slice(styles);
        Ok(())
    }

    fn clear_styles(&mut self) -> Result<(), PairviewError> {
        self.styles.clear();
        self.clear_count += 1;
        Ok(())
    }
}

/// Fails every request; used to verify styling failures never block
/// reconciliation.
#[derive(Debug, Default)]
pub struct FailingDecorationSink;

impl DecorationSink for FailingDecorationSink {
    fn apply_range_styles(
        &mut self,
        _styles: &[(LineRange, StyleClass)],
    ) -> Result<(), PairviewError> {
        Err(PairviewError::Generic("decoration sink offline".to_string()))
    }

    fn clear_styles(&mut self) -> Result<(), PairviewError> {
        Err(PairviewError::Generic("decoration sink offline".to_string()))
    }
}
