pub mod types;
pub mod parser;

pub use types::{CommitInfo, CommitType};
pub use parser::{normalize_date, parse_commit_log, LOG_FORMAT};
