pub mod types;
pub mod date;
pub mod patch;

pub use types::HistoryEntry;
pub use date::{header_date, history_dates, HEADER_SCAN_BYTES};
pub use patch::{apply_header_patch, parse_history_entries};
