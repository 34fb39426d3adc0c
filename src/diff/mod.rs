pub mod types;
pub mod hunk;
pub mod merge;

pub use types::ChangeBlock;
pub use hunk::parse_diff_to_line_numbers;
pub use merge::{merge_nearby_changes, DEFAULT_MERGE_TOLERANCE};
