pub mod types;
pub mod index;
pub mod reconcile;

pub use types::{MarkerRange, MarkerRole, MarkerSignature};
pub use index::{find_existing_marker_ranges, marker_role, marker_signature};
pub use reconcile::{
    ensure_markers, ensure_markers_with, find_uncovered_block, validate_markers, CommentFilter,
    ReconcileOptions,
};

/// Split file content into lines the way the reconciliation engine indexes them:
/// on `\n`, dropping a trailing `\r`, keeping a final empty line when the
/// content ends with a newline.
pub(crate) fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect()
}
