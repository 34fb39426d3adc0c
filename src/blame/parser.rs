use std::collections::HashMap;

use super::types::BlameLine;

const UNCOMMITTED_SHA: &str = "0000000000000000000000000000000000000000";

/// Parse `git blame --porcelain` (or `--line-porcelain`) output into one
/// [`BlameLine`] per line of the file, ordered by final line number.
///
/// The porcelain format looks like:
/// ```text
/// <40-char sha> <orig_line> <final_line> [<num_lines>]
/// author <name>
/// author-mail <<email>>
/// ...
/// summary <text>
/// filename <path>
/// \t<line content>
/// ```
///
/// Plain `--porcelain` prints the commit headers only the first time a commit
/// appears, so authors are remembered per sha.
pub fn parse_blame_output(raw: &[u8]) -> Vec<BlameLine> {
    let input = match std::str::from_utf8(raw) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut lines: Vec<BlameLine> = Vec::new();
    let mut authors: HashMap<String, String> = HashMap::new();

    let mut current_sha = String::new();
    let mut current_final_line: u32 = 0;
    let mut in_entry = false;

    for line in input.split('\n') {
        // Content lines carry the file text verbatim after one tab.
        if let Some(content) = line.strip_prefix('\t') {
            if !in_entry {
                continue;
            }
            let content = content.strip_suffix('\r').unwrap_or(content);
            let committed = current_sha != UNCOMMITTED_SHA;
            lines.push(BlameLine {
                line: current_final_line,
                hash: committed.then(|| current_sha.clone()),
                author: if committed {
                    authors.get(&current_sha).cloned()
                } else {
                    None
                },
                content: content.to_string(),
            });
            in_entry = false;
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        if is_sha_header(line) {
            let parts: Vec<&str> = line.split_whitespace().collect();
            current_sha = parts[0].to_string();
            current_final_line = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);
            in_entry = true;
            continue;
        }

        if !in_entry {
            continue;
        }

        if let Some(val) = line.strip_prefix("author ") {
            authors.insert(current_sha.clone(), val.to_string());
        }
        // Remaining headers (author-mail, committer*, summary, previous,
        // boundary, filename) carry nothing the marker layer uses.
    }

    lines.sort_by_key(|l| l.line);
    lines
}

/// Check if a line looks like a blame SHA header.
///
/// A SHA header line starts with 40 hex characters followed by at least two
/// space-separated numbers (orig_line and final_line).
fn is_sha_header(line: &str) -> bool {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return false;
    }

    let sha_candidate = parts[0];
    if sha_candidate.len() != 40 {
        return false;
    }
    if !sha_candidate.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    parts[1].parse::<u32>().is_ok() && parts[2].parse::<u32>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA_A: &str = "abcdef0123456789abcdef0123456789abcdef01";
    const SHA_B: &str = "1111111111111111111111111111111111111111";

    #[test]
    fn test_is_sha_header() {
        assert!(is_sha_header(
            "abcdef0123456789abcdef0123456789abcdef01 1 1 3"
        ));
        assert!(is_sha_header(
            "abcdef0123456789abcdef0123456789abcdef01 10 20"
        ));
        assert!(!is_sha_header("author John Doe"));
        assert!(!is_sha_header("summary Fix bug 1 2"));
        assert!(!is_sha_header("short 1 1 1"));
    }

    #[test]
    fn test_porcelain_reuses_author_for_repeated_sha() {
        let raw = format!(
            "{a} 1 1 2\nauthor Alice\nauthor-mail <alice@example.com>\nsummary Initial\nfilename pkg.plsql\n\tPROCEDURE Run IS\n\
             {a} 2 2\n\tBEGIN\n\
             {b} 5 3 1\nauthor Bob\nsummary Change\nprevious {a} pkg.plsql\nfilename pkg.plsql\n\t   v_x := 1;\n",
            a = SHA_A,
            b = SHA_B
        );
        let lines = parse_blame_output(raw.as_bytes());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].content, "PROCEDURE Run IS");
        assert_eq!(lines[1].author.as_deref(), Some("Alice"));
        assert_eq!(lines[1].content, "BEGIN");
        assert_eq!(lines[2].line, 3);
        assert_eq!(lines[2].hash.as_deref(), Some(SHA_B));
        assert_eq!(lines[2].author.as_deref(), Some("Bob"));
        assert_eq!(lines[2].content, "   v_x := 1;");
    }

    #[test]
    fn test_uncommitted_lines_have_no_hash() {
        let raw = format!(
            "{} 1 1 1\nauthor Not Committed Yet\nfilename x.plsql\n\tnew line\n",
            UNCOMMITTED_SHA
        );
        let lines = parse_blame_output(raw.as_bytes());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].hash, None);
        assert_eq!(lines[0].author, None);
    }

    #[test]
    fn test_empty_and_tab_only_content() {
        assert!(parse_blame_output(b"").is_empty());
        let raw = format!("{} 1 1 1\nauthor Alice\nfilename x\n\t\n", SHA_A);
        let lines = parse_blame_output(raw.as_bytes());
        assert_eq!(lines[0].content, "");
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(parse_blame_output(&[0xff, 0xfe, 0x00]).is_empty());
    }
}
