use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::KeywordClassifier;
use crate::diff::{merge_nearby_changes, parse_diff_to_line_numbers, ChangeBlock, DEFAULT_MERGE_TOLERANCE};

use super::index::{find_ranges_in_lines, marker_role, marker_signature};
use super::split_lines;
use super::types::{MarkerRange, MarkerRole, MarkerSignature};

/// How a changed block is judged to be comment-only and therefore exempt from markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentFilter {
    /// Every non-blank line in the block is a comment or a marker.
    #[default]
    WholeSpan,
    /// Only the block's first line is inspected. Looser: a comment line on top
    /// of real code hides the whole block.
    FirstLine,
}

/// Tuning for [`ensure_markers_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub comment_filter: CommentFilter,
    pub merge_tolerance: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            comment_filter: CommentFilter::WholeSpan,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
        }
    }
}

/// Returns `true` when every non-comment change in `diff` sits inside an
/// existing Start/End marker pair of `content`.
///
/// Read-only; meant for status reporting. An empty or header-less diff is valid.
/// The diff may predate markers already inserted for it.
pub fn validate_markers(content: &str, diff: &str) -> bool {
    find_uncovered_block(content, diff).is_none()
}

/// The first change block (in diff order) that no marker pair covers, if any.
pub fn find_uncovered_block(content: &str, diff: &str) -> Option<ChangeBlock> {
    let lines = split_lines(content);
    let existing = find_ranges_in_lines(&lines);

    let mut signatures: Vec<MarkerSignature> = Vec::new();
    for sig in lines.iter().filter_map(|l| marker_signature(l)) {
        if !signatures.contains(&sig) {
            signatures.push(sig);
        }
    }

    let uncovered = best_reading(&lines, &existing, &signatures, diff, CommentFilter::WholeSpan, None)
        .into_iter()
        .next();

    if let Some(block) = uncovered {
        debug!(
            start = block.start_line + 1,
            end = block.end_line + 1,
            "change block is not covered by a marker pair"
        );
    }
    uncovered
}

/// Wrap every uncovered logic change in `-- [ticket] sign Start` / `End` lines.
///
/// Returns `content` unchanged (byte for byte) when there is nothing to insert,
/// so callers can compare to decide whether to write. Running again with the
/// same diff is a no-op.
pub fn ensure_markers(content: &str, diff: &str, ticket_id: &str, sign: &str) -> String {
    ensure_markers_with(content, diff, ticket_id, sign, &ReconcileOptions::default())
}

/// [`ensure_markers`] with explicit filter and merge settings.
pub fn ensure_markers_with(
    content: &str,
    diff: &str,
    ticket_id: &str,
    sign: &str,
    options: &ReconcileOptions,
) -> String {
    let lines = split_lines(content);
    let existing = find_ranges_in_lines(&lines);
    let own = [MarkerSignature::new(ticket_id, sign)];

    let pending = best_reading(
        &lines,
        &existing,
        &own,
        diff,
        options.comment_filter,
        Some(options.merge_tolerance),
    );
    if pending.is_empty() {
        return content.to_string();
    }
    info!(blocks = pending.len(), "wrapping unmarked logic blocks");

    let mut patched: Vec<String> = lines.iter().map(|l| l.to_string()).collect();

    // Bottom-up: splicing below a block never moves the lines of blocks above it.
    for block in pending.iter().rev() {
        let indent = leading_whitespace(lines[block.start_line]);
        patched.insert(
            block.end_line + 1,
            format!("{}-- [{}] {} End", indent, ticket_id, sign),
        );
        patched.insert(
            block.start_line,
            format!("{}-- [{}] {} Start", indent, ticket_id, sign),
        );
    }

    patched.join("\n")
}

/// Content lines with some marker lines hidden, indexed back into the content.
struct LineView<'a> {
    lines: Vec<&'a str>,
    to_content: Vec<usize>,
    hidden: Vec<usize>,
}

impl<'a> LineView<'a> {
    fn identity(lines: &[&'a str]) -> Self {
        LineView {
            lines: lines.to_vec(),
            to_content: (0..lines.len()).collect(),
            hidden: Vec::new(),
        }
    }

    fn without(lines: &[&'a str], signature: &MarkerSignature) -> Self {
        let mut view = LineView {
            lines: Vec::with_capacity(lines.len()),
            to_content: Vec::with_capacity(lines.len()),
            hidden: Vec::new(),
        };
        for (i, line) in lines.iter().enumerate() {
            if marker_signature(line).as_ref() == Some(signature) {
                view.hidden.push(i);
            } else {
                view.lines.push(*line);
                view.to_content.push(i);
            }
        }
        view
    }

    fn map_block(&self, block: &ChangeBlock) -> ChangeBlock {
        ChangeBlock::new(self.to_content[block.start_line], self.to_content[block.end_line])
    }

    /// Every hidden line sits right above or right below one of `blocks`,
    /// as it would if it had been inserted to wrap them.
    fn hides_only_wrappers(&self, blocks: &[ChangeBlock]) -> bool {
        self.hidden
            .iter()
            .all(|&h| blocks.iter().any(|b| h + 1 == b.start_line || h == b.end_line + 1))
    }
}

/// Unmarked blocks of `diff`, in content coordinates and diff order.
///
/// The diff is read against the content as it is, and against the content
/// without each signature's markers, since a diff taken before those markers
/// were inserted indexes the file without them. The reading with the fewest
/// unmarked blocks wins; ties go to the content as it is.
fn best_reading(
    lines: &[&str],
    existing: &[MarkerRange],
    signatures: &[MarkerSignature],
    diff: &str,
    filter: CommentFilter,
    merge_tolerance: Option<usize>,
) -> Vec<ChangeBlock> {
    let mut best = unmarked_blocks(lines, existing, &LineView::identity(lines), diff, filter, merge_tolerance)
        .unwrap_or_default();

    for signature in signatures {
        if best.is_empty() {
            break;
        }
        let view = LineView::without(lines, signature);
        if view.hidden.is_empty() {
            continue;
        }
        if let Some(found) = unmarked_blocks(lines, existing, &view, diff, filter, merge_tolerance) {
            if found.len() < best.len() {
                debug!(ticket = %signature.ticket, "diff predates markers already in the file");
                best = found;
            }
        }
    }
    best
}

/// `None` when the view hides markers that do not wrap any of the diff's blocks.
fn unmarked_blocks(
    lines: &[&str],
    existing: &[MarkerRange],
    view: &LineView<'_>,
    diff: &str,
    filter: CommentFilter,
    merge_tolerance: Option<usize>,
) -> Option<Vec<ChangeBlock>> {
    let blocks = relevant_blocks(&view.lines, diff, filter);
    let blocks = match merge_tolerance {
        Some(tolerance) => merge_nearby_changes(&blocks, tolerance),
        None => blocks,
    };
    let blocks: Vec<ChangeBlock> = blocks.iter().map(|b| view.map_block(b)).collect();

    if !view.hides_only_wrappers(&blocks) {
        return None;
    }

    Some(
        blocks
            .into_iter()
            .filter(|b| {
                let marked = has_adjacent_markers(lines, b) || existing.iter().any(|m| m.covers(b));
                if marked {
                    debug!(start = b.start_line + 1, end = b.end_line + 1, "block already marked");
                }
                !marked
            })
            .collect(),
    )
}

/// Parse the diff, clip blocks to the content, and drop comment-only blocks.
fn relevant_blocks(lines: &[&str], diff: &str, filter: CommentFilter) -> Vec<ChangeBlock> {
    let last = match lines.len().checked_sub(1) {
        Some(l) => l,
        None => return Vec::new(),
    };

    parse_diff_to_line_numbers(diff)
        .into_iter()
        .filter(|b| b.start_line <= last)
        .map(|b| ChangeBlock::new(b.start_line, b.end_line.min(last)))
        .filter(|b| !is_comment_block(lines, b, filter))
        .collect()
}

fn is_comment_block(lines: &[&str], block: &ChangeBlock, filter: CommentFilter) -> bool {
    match filter {
        CommentFilter::FirstLine => is_comment_line(lines[block.start_line].trim()),
        CommentFilter::WholeSpan => lines[block.start_line..=block.end_line]
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .all(|l| is_comment_line(l) || marker_role(l).is_some()),
    }
}

fn is_comment_line(trimmed: &str) -> bool {
    KeywordClassifier::default_ref().is_comment(trimmed)
}

/// The block is directly bracketed by a Start marker above and an End marker below.
fn has_adjacent_markers(lines: &[&str], block: &ChangeBlock) -> bool {
    if block.start_line == 0 || block.end_line + 1 >= lines.len() {
        return false;
    }
    marker_role(lines[block.start_line - 1]) == Some(MarkerRole::Start)
        && marker_role(lines[block.end_line + 1]) == Some(MarkerRole::End)
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}
