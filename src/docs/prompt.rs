use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

use crate::history::CommitInfo;

/// Commits included in one forensic summary.
pub const MAX_FORENSIC_COMMITS: usize = 10;
/// History depth queried when the file has no header date to start from.
pub const NO_HEADER_LOG_LIMIT: usize = 20;

/// A commit together with its diff for the file being documented.
#[derive(Debug, Clone)]
pub struct ForensicCommit {
    pub commit: CommitInfo,
    pub diff: String,
}

fn leading_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*```(?:plsql|sql)?[ \t]*\r?\n?").expect("static fence regex"))
}

fn trailing_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n?```\s*$").expect("static fence regex"))
}

/// Keep only added/removed lines and hunk headers from a commit diff.
fn condense_diff(diff: &str) -> String {
    diff.lines()
        .filter(|l| l.starts_with('+') || l.starts_with('-') || l.trim_start().starts_with("@@"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One section per commit, newest first, at most [`MAX_FORENSIC_COMMITS`].
pub fn forensic_summary(commits: &[ForensicCommit]) -> String {
    let mut out = String::new();
    for entry in commits.iter().take(MAX_FORENSIC_COMMITS) {
        let _ = writeln!(
            out,
            "=== COMMIT {} on {} by {} ({}) ===",
            entry.commit.hash, entry.commit.date, entry.commit.author, entry.commit.subject
        );
        let _ = writeln!(out, "{}", condense_diff(&entry.diff));
        out.push('\n');
    }
    out
}

/// Assemble the documentation request for one file.
pub fn build_prompt(file_name: &str, forensic: &str, code: &str) -> String {
    format!(
        "You maintain the documentation of PL/SQL sources. Update the comments of \
the file below so they reflect the listed commits, which all happened after the \
documentation was last touched.\n\
\n\
Header history:\n\
- Keep the existing header block and its history list.\n\
- Add one entry per change as `--  YYMMDD  SIGN    [TICKET] Description`, newest first.\n\
- Use a ticket id found in the commit subject or diff (for example SC-1234); \
otherwise use MOD-YYMMDD with the commit date.\n\
\n\
Change markers:\n\
- Wrap changed logic in `-- [TICKET] SIGN Start` and `-- [TICKET] SIGN End` lines.\n\
- Reformat legacy markers such as `-- 050519 ERW Start` into that form instead of removing them.\n\
\n\
Method comments:\n\
- Give every function, procedure and view a short banner comment naming it and \
describing what it does.\n\
\n\
Constraints:\n\
- Do not change any code. Only comments may be added or reformatted.\n\
- Keep every special character ($, &, |) and everything from `$SEARCH` onwards untouched.\n\
- Keep all Log_Sys and Dbms_Output calls.\n\
- Reply with the complete file only, without Markdown fences.\n\
\n\
COMMITS for '{file_name}':\n\
{forensic}\n\
SOURCE of '{file_name}':\n\
{code}\n"
    )
}

/// Strip a Markdown code fence the model may wrap the file in.
pub fn clean_response(text: &str) -> String {
    let without_head = leading_fence_regex().replace(text, "");
    trailing_fence_regex().replace(&without_head, "").into_owned()
}
