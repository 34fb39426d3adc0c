//! Whole-file marker regeneration from blame and commit history.
//!
//! Unlike [`crate::marker::ensure_markers`], which patches one diff into an
//! existing marker layer, this rebuilds every marker below the header from
//! scratch: each run of lines last touched by the same labelled commit gets a
//! `-- Start [label] author` / `-- End [label] author` pair, or an inline
//! `-- [label] author` comment when the run is a single line.

pub mod label;
pub mod annotate;
pub mod dates;

pub use label::{build_commit_labels, Attribution};
pub use annotate::{regenerate_markers, AnnotateOptions};
pub use dates::{latest_marker_date, marker_dates};
