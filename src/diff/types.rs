use serde::{Deserialize, Serialize};

/// A zero-based, inclusive line range in the current file that a diff hunk touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBlock {
    pub start_line: usize,
    pub end_line: usize,
}

impl ChangeBlock {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        ChangeBlock {
            start_line,
            end_line,
        }
    }
}
