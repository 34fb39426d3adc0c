use std::sync::OnceLock;

use regex::Regex;

use super::types::ChangeBlock;

fn hunk_header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^@@\s-[0-9,]+\s\+(\d+)(?:,(\d+))?\s@@").expect("static hunk regex")
    })
}

/// Convert a zero-context unified diff into the ranges it touched in the new file.
///
/// Only the `+c,d` side of each `@@ -a,b +c,d @@` header is read. `d` defaults
/// to 1 when omitted; pure deletions (`d == 0`) produce no block. Output order
/// follows the diff and is not guaranteed sorted.
///
/// A diff without any hunk header yields an empty vector.
pub fn parse_diff_to_line_numbers(diff: &str) -> Vec<ChangeBlock> {
    let re = hunk_header_regex();
    let mut blocks = Vec::new();

    for line in diff.lines() {
        let caps = match re.captures(line) {
            Some(c) => c,
            None => continue,
        };

        let start: usize = match caps[1].parse() {
            Ok(n) => n,
            Err(_) => continue,
        };
        let count: usize = match caps.get(2) {
            Some(m) => match m.as_str().parse() {
                Ok(n) => n,
                Err(_) => continue,
            },
            None => 1,
        };

        if count == 0 {
            continue;
        }

        // `+0,n` only appears with n == 0 in practice; guard the subtraction anyway.
        let start_line = start.saturating_sub(1);
        blocks.push(ChangeBlock::new(start_line, start_line + count - 1));
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_hunk() {
        let blocks = parse_diff_to_line_numbers("@@ -10,0 +11,3 @@\n+a\n+b\n+c\n");
        assert_eq!(blocks, vec![ChangeBlock::new(10, 12)]);
    }

    #[test]
    fn test_count_defaults_to_one() {
        let blocks = parse_diff_to_line_numbers("@@ -4 +4 @@\n-old\n+new\n");
        assert_eq!(blocks, vec![ChangeBlock::new(3, 3)]);
    }

    #[test]
    fn test_pure_deletion_dropped() {
        let blocks = parse_diff_to_line_numbers("@@ -7,2 +6,0 @@\n-x\n-y\n");
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_full_git_diff_with_metadata() {
        let diff = "diff --git a/pkg.plsql b/pkg.plsql\n\
                    index 1111111..2222222 100644\n\
                    --- a/pkg.plsql\n\
                    +++ b/pkg.plsql\n\
                    @@ -20,0 +21,2 @@ PROCEDURE Foo IS\n\
                    +   v_a := 1;\n\
                    +   v_b := 2;\n\
                    @@ -3,1 +5,1 @@\n\
                    -x\n\
                    +y\n";
        let blocks = parse_diff_to_line_numbers(diff);
        assert_eq!(blocks, vec![ChangeBlock::new(20, 21), ChangeBlock::new(4, 4)]);
    }

    #[test]
    fn test_no_headers_is_empty() {
        assert!(parse_diff_to_line_numbers("").is_empty());
        assert!(parse_diff_to_line_numbers("+just text\n-without headers").is_empty());
    }

    #[test]
    fn test_added_line_that_looks_like_header_is_ignored() {
        // Content lines carry a +/- prefix, so they can never start with "@@".
        let blocks = parse_diff_to_line_numbers("@@ -1,0 +2,1 @@\n+@@ -1 +1 @@\n");
        assert_eq!(blocks, vec![ChangeBlock::new(1, 1)]);
    }
}
