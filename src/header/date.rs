use std::sync::OnceLock;

use regex::Regex;

/// Only the start of a file is searched for the header date.
pub const HEADER_SCAN_BYTES: usize = 8192;

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"--\s+(\d{6})\s+[\w\d]+").expect("static header regex"))
}

/// The "documentation last updated" date: the first `-- YYMMDD SIGN` comment
/// near the top of the file. `None` means the file has no header.
pub fn header_date(content: &str) -> Option<String> {
    let mut end = content.len().min(HEADER_SCAN_BYTES);
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    header_regex()
        .captures(&content[..end])
        .map(|c| c[1].to_string())
}

/// Every `-- YYMMDD SIGN` date in `header_text`, in file order.
pub fn history_dates(header_text: &str) -> Vec<String> {
    header_regex()
        .captures_iter(header_text)
        .map(|c| c[1].to_string())
        .collect()
}
