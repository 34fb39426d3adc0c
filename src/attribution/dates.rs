use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

fn label_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(?:ADD|MOD)-(\d{6})-\d+\]").expect("static label regex"))
}

/// The code below the header boundary, or the whole content when there is no
/// boundary (or it never matches).
pub(crate) fn code_body<'a>(content: &'a str, boundary: Option<&Regex>) -> &'a str {
    let re = match boundary {
        Some(re) => re,
        None => return content,
    };

    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        offset += line.len();
        if re.is_match(line.trim_end_matches(|c: char| c == '\n' || c == '\r')) {
            return &content[offset..];
        }
    }
    content
}

/// Unique `YYMMDD` dates found in `[ADD|MOD-YYMMDD-n]` labels in the code body,
/// ascending.
pub fn marker_dates(content: &str, boundary: Option<&Regex>) -> Vec<String> {
    let body = code_body(content, boundary);
    let dates: BTreeSet<String> = label_date_regex()
        .captures_iter(body)
        .map(|c| c[1].to_string())
        .collect();
    dates.into_iter().collect()
}

/// Newest marker date in the file; bounds incremental history queries.
pub fn latest_marker_date(content: &str, boundary: Option<&Regex>) -> Option<String> {
    marker_dates(content, boundary).pop()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = "-- [MOD-230101-1] in header is ignored\n\
                        -- END OF HEADER\n\
                        v_a := 1; -- [MOD-240615-2] Bob\n\
                        -- Start [ADD-240101-1] Alice\n\
                        v_b := 2;\n\
                        -- End [ADD-240101-1] Alice\n\
                        v_c := 3; -- [MOD-240615-1] Bob\n";

    #[test]
    fn test_dates_below_boundary() {
        let boundary = Regex::new("END OF HEADER").unwrap();
        assert_eq!(marker_dates(FILE, Some(&boundary)), vec!["240101", "240615"]);
        assert_eq!(latest_marker_date(FILE, Some(&boundary)).as_deref(), Some("240615"));
    }

    #[test]
    fn test_whole_file_without_boundary() {
        assert_eq!(marker_dates(FILE, None), vec!["230101", "240101", "240615"]);
    }

    #[test]
    fn test_no_markers() {
        assert!(marker_dates("v_a := 1;", None).is_empty());
        assert_eq!(latest_marker_date("", None), None);
    }
}
