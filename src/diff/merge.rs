use super::types::ChangeBlock;

/// Gap (in lines) under which two change blocks share a single marker pair.
pub const DEFAULT_MERGE_TOLERANCE: usize = 2;

/// Coalesce change blocks that sit within `tolerance` lines of each other.
///
/// The input is sorted by start line first; the output is ascending and
/// non-overlapping. Two edits separated only by a blank or a single unrelated
/// line end up under one marker wrapper instead of two adjacent ones.
pub fn merge_nearby_changes(blocks: &[ChangeBlock], tolerance: usize) -> Vec<ChangeBlock> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut sorted = blocks.to_vec();
    sorted.sort_by_key(|b| b.start_line);

    let mut merged = Vec::with_capacity(sorted.len());
    let mut current = sorted[0];

    for next in sorted.into_iter().skip(1) {
        // Overlapping blocks have next.start <= current.end: the gap is zero.
        let gap = next.start_line.saturating_sub(current.end_line);
        if gap <= tolerance {
            current.end_line = current.end_line.max(next.end_line);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    merged
}
