pub mod types;
pub mod analyze;
pub mod missing;

pub use types::{AuditCache, AuditResult, CacheRecord, DocStatus, MissingDates};
pub use analyze::analyze_file;
pub use missing::{header_text, recorded_dates, scan_missing_dates, FindingKind};
