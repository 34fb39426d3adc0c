use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use super::NoiseClassifier;

/// Keywords that, alone at the start of a line, mark it as block structure
/// rather than logic.
pub const STRUCTURAL_KEYWORDS: &[&str] = &[
    "CURSOR",
    "IS",
    "BEGIN",
    "END",
    "IF",
    "THEN",
    "ELSE",
    "ELSIF",
    "FOR",
    "LOOP",
    "RETURN",
    "EXCEPTION",
    "FUNCTION",
    "PROCEDURE",
    "PRAGMA",
    "TYPE",
    "CONSTANT",
    "NULL",
    "WHEN",
    "AS",
];

const DEFAULT_COMMENT_PREFIXES: &[&str] = &["--", "//", "/*"];

/// Lexical noise classifier for PL/SQL-like sources.
///
/// A line is noise when it is empty, starts with a comment token, or starts with
/// one of the keywords followed by whitespace, `;`, `(` or end of line
/// (case-insensitive). This is an allow-list heuristic, not a parser.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    comment_prefixes: Vec<String>,
    keyword_regex: Option<Regex>,
}

impl KeywordClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        let keyword_regex = build_keyword_regex(&keywords);
        KeywordClassifier {
            comment_prefixes: DEFAULT_COMMENT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            keyword_regex,
        }
    }

    /// Replace the set of comment openers (default: `--`, `//`, `/*`).
    pub fn with_comment_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comment_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Shared instance with the default keyword set.
    pub fn default_ref() -> &'static KeywordClassifier {
        static DEFAULT: OnceLock<KeywordClassifier> = OnceLock::new();
        DEFAULT.get_or_init(KeywordClassifier::default)
    }

    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        KeywordClassifier::new(STRUCTURAL_KEYWORDS.iter().copied())
    }
}

impl NoiseClassifier for KeywordClassifier {
    fn is_noise_line(&self, line: &str) -> bool {
        line.is_empty()
            || self.is_comment(line)
            || self.keyword_regex.as_ref().is_some_and(|re| re.is_match(line))
    }
}

fn build_keyword_regex(keywords: &[String]) -> Option<Regex> {
    let alternation = keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .map(|k| regex::escape(k.trim()))
        .collect::<Vec<_>>()
        .join("|");

    // An empty alternation would match every line.
    if alternation.is_empty() {
        return None;
    }

    let pattern = format!(r"^\s*(?:{})(?:\s|;|\(|$)", alternation);
    Some(
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .expect("escaped keyword alternation is a valid regex"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_keywords_are_noise() {
        let c = KeywordClassifier::default();
        for line in ["END;", "end if;", "BEGIN", "ELSE", "RETURN(v_x);", "exception", "NULL;"] {
            assert!(c.is_noise_line(line), "{line} should be noise");
        }
    }

    #[test]
    fn test_keyword_prefix_of_identifier_is_logic() {
        let c = KeywordClassifier::default();
        assert!(!c.is_noise_line("ending_balance := 0;"));
        assert!(!c.is_noise_line("IFS_Api.Do(x);"));
        assert!(!c.is_noise_line("v_is_set := TRUE;"));
    }

    #[test]
    fn test_keyword_with_trailing_code_still_noise() {
        // The heuristic only anchors at line start: "RETURN v_total;" is structural.
        let c = KeywordClassifier::default();
        assert!(c.is_noise_line("RETURN v_total;"));
        assert!(c.is_noise_line("IF v_a > 0 THEN"));
    }

    #[test]
    fn test_custom_keywords_and_prefixes() {
        let c = KeywordClassifier::new(["GO"]).with_comment_prefixes(["#"]);
        assert!(c.is_noise_line("go"));
        assert!(c.is_noise_line("# note"));
        assert!(!c.is_noise_line("-- not a comment here"));
        assert!(!c.is_noise_line("END;"));
    }

    #[test]
    fn test_empty_keyword_set_matches_nothing() {
        let c = KeywordClassifier::new(Vec::<String>::new());
        assert!(!c.is_noise_line("END;"));
        assert!(c.is_noise_line(""));
    }
}
