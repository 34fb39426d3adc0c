pub mod error;
pub mod config;
pub mod diff;
pub mod classify;
pub mod marker;
pub mod blame;
pub mod history;
pub mod filter;
pub mod attribution;
pub mod header;
pub mod docs;
pub mod vcs;
pub mod audit;
pub mod workspace;

use wasm_bindgen::prelude::*;

use config::Settings;
use error::{CoreError, CoreResult};
use header::HistoryEntry;

pub use workspace::Workspace;

// ---------------------------------------------------------------------------
// JSON result wrappers.
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct ContentResult {
    content: String,
}

#[derive(serde::Serialize)]
struct ErrorResult {
    error: String,
}

fn json_error(msg: &str) -> String {
    serde_json::to_string(&ErrorResult {
        error: msg.to_string(),
    })
    .unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", msg))
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| json_error(&format!("Serialization error: {}", e)))
}

fn content_json(result: CoreResult<String>) -> String {
    match result {
        Ok(content) => to_json(&ContentResult { content }),
        Err(e) => json_error(&e.to_string()),
    }
}

/// Empty input means "no keywords".
fn parse_keywords(json: &str) -> CoreResult<Vec<String>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(json)?)
}

// ---------------------------------------------------------------------------
// WASM-exported functions
// ---------------------------------------------------------------------------

/// Parse a unified diff into changed line ranges of the new file.
///
/// Returns: JSON array of `{ startLine, endLine }` (0-based, inclusive).
#[wasm_bindgen]
pub fn parse_diff_hunks(diff: &str) -> String {
    to_json(&diff::parse_diff_to_line_numbers(diff))
}

/// Whether a diff changes logic rather than comments, whitespace or bare keywords.
#[wasm_bindgen]
pub fn has_logic_changes(diff: &str) -> bool {
    classify::has_logic_changes(diff)
}

/// Whether every logic change in `diff` is wrapped in a Start/End marker pair.
#[wasm_bindgen]
pub fn validate_markers(content: &str, diff: &str) -> bool {
    marker::validate_markers(content, diff)
}

/// Returns: JSON `{ startLine, endLine }` of the first unmarked change, or `null`.
#[wasm_bindgen]
pub fn find_uncovered_block(content: &str, diff: &str) -> String {
    to_json(&marker::find_uncovered_block(content, diff))
}

/// Wrap unmarked logic changes in `-- [ticket] sign Start/End` lines.
///
/// Returns the patched content, or `content` unchanged when nothing needed
/// marking.
#[wasm_bindgen]
pub fn ensure_markers(content: &str, diff: &str, ticket_id: &str, sign: &str) -> String {
    marker::ensure_markers(content, diff, ticket_id, sign)
}

/// Parse raw `git blame --line-porcelain` output into JSON.
///
/// Returns: JSON array of `{ line, hash, author, content }`.
#[wasm_bindgen]
pub fn parse_blame(raw_blame: &[u8]) -> String {
    to_json(&blame::parse_blame_output(raw_blame))
}

/// Parse history output (see `history::LOG_FORMAT`), dropping commits whose
/// subject mentions a skip keyword.
///
/// `skip_keywords_json` is a JSON array of strings, or empty.
/// Returns: JSON array of `{ hash, date, author, subject, type }`.
#[wasm_bindgen]
pub fn parse_commit_log(raw_log: &[u8], skip_keywords_json: &str) -> String {
    let keywords = match parse_keywords(skip_keywords_json) {
        Ok(k) => k,
        Err(e) => return json_error(&e.to_string()),
    };
    let commits = filter::filter_skipped_commits(history::parse_commit_log(raw_log), &keywords);
    to_json(&commits)
}

/// Rebuild the marker layer of a file from its blame and history.
///
/// `raw_log` should already be bounded by the host for incremental scans.
/// The marker rule is looked up from `settings_json` by `file_path`.
/// Returns: JSON `{ content }` or `{ error }`.
#[wasm_bindgen]
pub fn regenerate_markers(raw_blame: &[u8], raw_log: &[u8], file_path: &str, settings_json: &str) -> String {
    content_json(regenerate_from_raw(raw_blame, raw_log, file_path, settings_json))
}

fn regenerate_from_raw(raw_blame: &[u8], raw_log: &[u8], file_path: &str, settings_json: &str) -> CoreResult<String> {
    let settings = Settings::from_json(settings_json)?;
    let rule = settings
        .rule_for(file_path)?
        .ok_or_else(|| CoreError::NoRule(file_path.to_string()))?;
    let boundary = rule.header_boundary()?;

    let commits = filter::filter_skipped_commits(history::parse_commit_log(raw_log), &settings.skip_keywords);
    let labels = attribution::build_commit_labels(&commits);
    let blame = blame::parse_blame_output(raw_blame);

    let options = attribution::AnnotateOptions {
        header_boundary: boundary.as_ref(),
        inline_skip_keywords: &rule.skip_keywords,
        scan_mode: settings.scan_mode,
    };
    Ok(attribution::regenerate_markers(&blame, &labels, &options))
}

/// Merge history entries into the file header.
///
/// `entries_json` is a JSON array of `{ date, sign, id, desc }`.
/// Returns: JSON `{ content }` or `{ error }`.
#[wasm_bindgen]
pub fn apply_header_patch(content: &str, entries_json: &str) -> String {
    content_json(
        serde_json::from_str::<Vec<HistoryEntry>>(entries_json)
            .map_err(CoreError::from)
            .map(|entries| header::apply_header_patch(content, &entries)),
    )
}

/// The `YYMMDD` documentation date from the file header, if any.
#[wasm_bindgen]
pub fn header_date(content: &str) -> Option<String> {
    header::header_date(content)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diff_hunks_wasm() {
        let parsed: serde_json::Value = serde_json::from_str(&parse_diff_hunks("@@ -10,0 +11,3 @@\n+a\n+b\n+c")).unwrap();
        assert_eq!(parsed[0]["startLine"], 10);
        assert_eq!(parsed[0]["endLine"], 12);
    }

    #[test]
    fn test_marker_round_trip_wasm() {
        let content = "BEGIN\n  v_total := 100;\nEND;";
        let diff = "@@ -2 +2 @@\n-  v_total := 0;\n+  v_total := 100;";
        assert!(has_logic_changes(diff));
        assert!(!validate_markers(content, diff));

        let uncovered: serde_json::Value = serde_json::from_str(&find_uncovered_block(content, diff)).unwrap();
        assert_eq!(uncovered["startLine"], 1);

        let patched = ensure_markers(content, diff, "SC-9", "ERW");
        assert_eq!(patched, "BEGIN\n  -- [SC-9] ERW Start\n  v_total := 100;\n  -- [SC-9] ERW End\nEND;");
        assert_eq!(find_uncovered_block(&patched, "@@ -2,0 +3,1 @@\n+  v_total := 100;"), "null");
    }

    #[test]
    fn test_parse_blame_wasm() {
        let raw = b"abcdef0123456789abcdef0123456789abcdef01 1 1 1\nauthor Alice\nauthor-time 1700000000\nsummary Initial commit\nfilename src/a.plsql\n\tBEGIN\n";
        let parsed: serde_json::Value = serde_json::from_str(&parse_blame(raw)).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["author"], "Alice");
        assert_eq!(parsed[0]["content"], "BEGIN");
    }

    #[test]
    fn test_parse_commit_log_wasm() {
        let raw = b"\x1eaaa\x00240615\x00Bob\x00SC-2 totals\n\nM\tsrc/a.plsql\n\x1ebbb\x00240101\x00Alice\x00Merge main\n\nA\tsrc/a.plsql\n";
        let parsed: serde_json::Value = serde_json::from_str(&parse_commit_log(raw, "")).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["type"], "ADD");

        let filtered: serde_json::Value = serde_json::from_str(&parse_commit_log(raw, r#"["merge"]"#)).unwrap();
        assert_eq!(filtered.as_array().unwrap().len(), 1);
        assert_eq!(filtered[0]["hash"], "aaa");

        let err: serde_json::Value = serde_json::from_str(&parse_commit_log(raw, "[nope")).unwrap();
        assert!(err.get("error").is_some());
    }

    #[test]
    fn test_regenerate_markers_wasm() {
        let blame = b"1111111111111111111111111111111111111111 1 1 2\nauthor Alice\n\tBEGIN\n1111111111111111111111111111111111111111 2 2\n\tEND;\n";
        let log = b"\x1e1111111111111111111111111111111111111111\x00240101\x00Alice\x00created\n\nA\ta.plsql\n";
        let settings = r#"{"rules": [{"filePattern": "**/*.plsql"}]}"#;

        let parsed: serde_json::Value =
            serde_json::from_str(&regenerate_markers(blame, log, "a.plsql", settings)).unwrap();
        assert_eq!(
            parsed["content"],
            "-- Start [ADD-240101-1] Alice\nBEGIN\nEND;\n-- End [ADD-240101-1] Alice"
        );

        let no_rule: serde_json::Value = serde_json::from_str(&regenerate_markers(blame, log, "a.plsql", "{}")).unwrap();
        assert_eq!(no_rule["error"], "no marker rule matches a.plsql");
    }

    #[test]
    fn test_apply_header_patch_wasm() {
        let content = "--  ------  ------  --------\nBEGIN";
        let entries = r#"[{"date": "240615", "sign": "AI", "id": "SC-2", "desc": "Totals"}]"#;
        let parsed: serde_json::Value = serde_json::from_str(&apply_header_patch(content, entries)).unwrap();
        assert_eq!(parsed["content"], "--  ------  ------  --------\n--  240615  AI      [SC-2] Totals\nBEGIN");

        let err: serde_json::Value = serde_json::from_str(&apply_header_patch(content, "{}")).unwrap();
        assert!(err.get("error").is_some());
    }

    #[test]
    fn test_header_date_wasm() {
        assert_eq!(header_date("--  240101  ERW  Created").as_deref(), Some("240101"));
        assert_eq!(header_date("BEGIN NULL; END;"), None);
    }
}
