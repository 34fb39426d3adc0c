use serde::{Deserialize, Serialize};

use crate::diff::ChangeBlock;

/// Line indices of an existing Start/End marker pair (`start < end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRange {
    pub start: usize,
    pub end: usize,
}

impl MarkerRange {
    /// Whether the block lies fully inside this range, marker lines included.
    pub fn covers(&self, block: &ChangeBlock) -> bool {
        block.start_line >= self.start && block.end_line <= self.end
    }
}

/// Which half of a marker pair a line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerRole {
    Start,
    End,
}

/// The `[ticket] sign` pair written into a marker line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerSignature {
    pub ticket: String,
    pub sign: String,
}

impl MarkerSignature {
    pub fn new(ticket: impl Into<String>, sign: impl Into<String>) -> Self {
        MarkerSignature {
            ticket: ticket.into(),
            sign: sign.into(),
        }
    }
}
