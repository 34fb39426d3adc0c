use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use super::split_lines;
use super::types::{MarkerRange, MarkerRole, MarkerSignature};

fn ci(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("static marker regex")
}

fn marker_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| ci(r"^\s*--\s+\[(.*?)\]\s+(\w+)\s+(Start|End)"))
}

fn start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| ci(r"--\s+\[.*?\]\s+\w+\s+Start"))
}

fn end_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| ci(r"--\s+\[.*?\]\s+\w+\s+End"))
}

/// Classify a line as a `-- [TICKET] SIGN Start|End` marker, if it is one.
pub fn marker_role(line: &str) -> Option<MarkerRole> {
    let caps = marker_line_regex().captures(line)?;
    if caps[3].eq_ignore_ascii_case("start") {
        Some(MarkerRole::Start)
    } else {
        Some(MarkerRole::End)
    }
}

/// The ticket and sign of a `-- [TICKET] SIGN Start|End` marker line.
pub fn marker_signature(line: &str) -> Option<MarkerSignature> {
    let caps = marker_line_regex().captures(line)?;
    Some(MarkerSignature::new(&caps[1], &caps[2]))
}

/// Scan content for Start/End marker pairs and return the line ranges they cover.
///
/// A Start opens a pending range (a second Start replaces it); the next End
/// closes it. A Start with no End before end of file is dropped, so a broken
/// marker never counts as coverage.
pub fn find_existing_marker_ranges(content: &str) -> Vec<MarkerRange> {
    find_ranges_in_lines(&split_lines(content))
}

pub(crate) fn find_ranges_in_lines(lines: &[&str]) -> Vec<MarkerRange> {
    let mut ranges = Vec::new();
    let mut pending: Option<usize> = None;

    for (i, line) in lines.iter().enumerate() {
        if start_regex().is_match(line) {
            pending = Some(i);
        } else if end_regex().is_match(line) {
            if let Some(start) = pending.take() {
                ranges.push(MarkerRange { start, end: i });
            }
        }
    }

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_role() {
        assert_eq!(marker_role("   -- [SC-12] ERW Start"), Some(MarkerRole::Start));
        assert_eq!(marker_role("-- [MOD-240615-1] AI end"), Some(MarkerRole::End));
        assert_eq!(marker_role("-- plain comment"), None);
        assert_eq!(marker_role("v_x := 1; -- [SC-12] ERW Start"), None);
        assert_eq!(marker_role("-- Start [MOD-240615-1] Bob"), None);
    }

    #[test]
    fn test_marker_signature() {
        assert_eq!(
            marker_signature("   -- [MOD-240615-1] AI Start"),
            Some(MarkerSignature::new("MOD-240615-1", "AI"))
        );
        assert_eq!(marker_signature("-- [SC-12] erw END"), Some(MarkerSignature::new("SC-12", "erw")));
        assert_eq!(marker_signature("-- note"), None);
    }

    #[test]
    fn test_pairs_are_indexed() {
        let content = "a\n-- [T-1] AB Start\nb\n-- [T-1] AB End\nc\n  -- [T-2] CD Start\nd\ne\n  -- [T-2] CD End";
        assert_eq!(
            find_existing_marker_ranges(content),
            vec![MarkerRange { start: 1, end: 3 }, MarkerRange { start: 5, end: 8 }]
        );
    }

    #[test]
    fn test_unterminated_start_dropped() {
        let content = "-- [T-1] AB Start\nx\ny";
        assert!(find_existing_marker_ranges(content).is_empty());
    }

    #[test]
    fn test_orphan_end_ignored_and_restart_replaces() {
        let content = "-- [T-0] AB End\n-- [T-1] AB Start\nx\n-- [T-2] AB Start\ny\n-- [T-2] AB End";
        assert_eq!(
            find_existing_marker_ranges(content),
            vec![MarkerRange { start: 3, end: 5 }]
        );
    }

    #[test]
    fn test_crlf_content() {
        let content = "-- [T-1] AB Start\r\nx\r\n-- [T-1] AB End\r\n";
        assert_eq!(
            find_existing_marker_ranges(content),
            vec![MarkerRange { start: 0, end: 2 }]
        );
    }
}
