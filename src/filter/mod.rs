pub mod keyword_filter;
pub mod date_filter;

pub use keyword_filter::filter_skipped_commits;
pub use date_filter::filter_commits_by_date;
