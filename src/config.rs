use glob::{MatchOptions, Pattern};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::marker::{CommentFilter, ReconcileOptions};

const DEFAULT_INCLUDE: &str = "**/*.{plsql,plsvc}";
const MAX_CONCURRENCY: usize = 10;

/// How far back history scans reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    /// Walk the whole history of the file.
    #[default]
    #[serde(rename = "Full Scan", alias = "full")]
    Full,
    /// Only look at commits since the newest date already recorded in the file,
    /// keeping labels that are already present.
    #[serde(rename = "Max Scan", alias = "incremental")]
    Incremental,
}

/// Per-file-pattern marker configuration, supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkerRule {
    pub file_pattern: String,
    /// Lines up to and including the first match are header and never marked.
    pub start_regex: Option<String>,
    /// Lines containing any of these pass through unmarked.
    pub skip_keywords: Vec<String>,
    /// Label for missing-marker findings in matching files.
    pub message: Option<String>,
}

impl MarkerRule {
    /// Whether the rule applies to `relative_path` (glob, `/`-separated).
    pub fn matches(&self, relative_path: &str) -> CoreResult<bool> {
        let pattern = compile_glob(&self.file_pattern)?;
        Ok(glob_matches(&pattern, relative_path))
    }

    /// The compiled header boundary, case-insensitive. `None` when unset.
    pub fn header_boundary(&self) -> CoreResult<Option<Regex>> {
        let raw = match self.start_regex.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => return Ok(None),
        };
        RegexBuilder::new(raw)
            .case_insensitive(true)
            .build()
            .map(Some)
            .map_err(|source| CoreError::InvalidPattern {
                pattern: raw.to_string(),
                source,
            })
    }
}

/// Extension settings, deserialized from the host's configuration JSON.
/// Every field has a default so partial settings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub include_docs: String,
    pub include_markers: String,
    pub skip_keywords: Vec<String>,
    pub auto_apply: bool,
    pub max_retries: u32,
    pub scan_mode: ScanMode,
    pub rules: Vec<MarkerRule>,
    pub concurrency: usize,
    pub merge_tolerance: usize,
    pub comment_filter: CommentFilter,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            include_docs: DEFAULT_INCLUDE.to_string(),
            include_markers: DEFAULT_INCLUDE.to_string(),
            skip_keywords: Vec::new(),
            auto_apply: true,
            max_retries: 3,
            scan_mode: ScanMode::Full,
            rules: Vec::new(),
            concurrency: 5,
            merge_tolerance: crate::diff::DEFAULT_MERGE_TOLERANCE,
            comment_filter: CommentFilter::WholeSpan,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> CoreResult<Settings> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether a non-blank API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Batch window size, clamped to `1..=10`.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }

    /// First rule whose file pattern matches, in declaration order.
    pub fn rule_for(&self, relative_path: &str) -> CoreResult<Option<&MarkerRule>> {
        for rule in &self.rules {
            if rule.matches(relative_path)? {
                return Ok(Some(rule));
            }
        }
        Ok(None)
    }

    pub fn wants_markers(&self, relative_path: &str) -> CoreResult<bool> {
        Ok(glob_matches(&compile_glob(&self.include_markers)?, relative_path))
    }

    pub fn wants_docs(&self, relative_path: &str) -> CoreResult<bool> {
        Ok(glob_matches(&compile_glob(&self.include_docs)?, relative_path))
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            comment_filter: self.comment_filter,
            merge_tolerance: self.merge_tolerance,
        }
    }
}

/// Compile a glob, expanding one level of `{a,b}` alternation, which
/// `glob::Pattern` does not support natively.
fn compile_glob(raw: &str) -> CoreResult<Vec<Pattern>> {
    expand_braces(raw)
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| CoreError::InvalidGlob {
                pattern: raw.to_string(),
                source,
            })
        })
        .collect()
}

fn expand_braces(raw: &str) -> Vec<String> {
    let (open, close) = match (raw.find('{'), raw.find('}')) {
        (Some(o), Some(c)) if o < c => (o, c),
        _ => return vec![raw.to_string()],
    };

    let prefix = &raw[..open];
    let suffix = &raw[close + 1..];
    raw[open + 1..close]
        .split(',')
        .flat_map(|alt| expand_braces(&format!("{}{}{}", prefix, alt.trim(), suffix)))
        .collect()
}

fn glob_matches(patterns: &[Pattern], relative_path: &str) -> bool {
    let normalized = relative_path.replace('\\', "/");
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    patterns.iter().any(|p| {
        p.matches_with(&normalized, options)
            // "**/x" also matches "x" at the workspace root.
            || p
                .as_str()
                .strip_prefix("**/")
                .and_then(|tail| Pattern::new(tail).ok())
                .is_some_and(|tail| tail.matches_with(&normalized, options))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_use_defaults() {
        let settings = Settings::from_json(r#"{"skipKeywords": ["merge"], "scanMode": "Max Scan"}"#).unwrap();
        assert_eq!(settings.skip_keywords, vec!["merge"]);
        assert_eq!(settings.scan_mode, ScanMode::Incremental);
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.max_retries, 3);
        assert!(settings.auto_apply);
        assert!(!settings.has_api_key());
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(Settings::from_json("{nope"), Err(CoreError::Json(_))));
    }

    #[test]
    fn test_concurrency_clamped() {
        let mut settings = Settings::default();
        settings.concurrency = 0;
        assert_eq!(settings.effective_concurrency(), 1);
        settings.concurrency = 64;
        assert_eq!(settings.effective_concurrency(), 10);
    }

    #[test]
    fn test_rule_lookup_by_glob() {
        let settings = Settings::from_json(
            r#"{"rules": [
                {"filePattern": "**/*.plsvc", "startRegex": "^-{10,}$"},
                {"filePattern": "source/**/*.plsql", "skipKeywords": ["Log_Sys"]}
            ]}"#,
        )
        .unwrap();

        let rule = settings.rule_for("source/ord/Order.plsql").unwrap().unwrap();
        assert_eq!(rule.skip_keywords, vec!["Log_Sys"]);
        let rule = settings.rule_for("a\\b\\Api.plsvc").unwrap().unwrap();
        assert!(rule.header_boundary().unwrap().is_some());
        assert!(settings.rule_for("other/Order.sql").unwrap().is_none());
    }

    #[test]
    fn test_include_patterns_with_braces() {
        let settings = Settings::default();
        assert!(settings.wants_markers("src/pkg/Order.plsql").unwrap());
        assert!(settings.wants_docs("Order.plsvc").unwrap());
        assert!(!settings.wants_docs("src/Order.rs").unwrap());
    }

    #[test]
    fn test_invalid_rule_patterns() {
        let rule = MarkerRule {
            file_pattern: "[".to_string(),
            start_regex: Some("(unclosed".to_string()),
            ..MarkerRule::default()
        };
        assert!(matches!(rule.matches("x"), Err(CoreError::InvalidGlob { .. })));
        assert!(matches!(rule.header_boundary(), Err(CoreError::InvalidPattern { .. })));
    }

    #[test]
    fn test_blank_start_regex_means_no_header() {
        let rule = MarkerRule {
            start_regex: Some("  ".to_string()),
            ..MarkerRule::default()
        };
        assert!(rule.header_boundary().unwrap().is_none());
    }
}
