use chrono::NaiveDate;

use crate::history::LOG_FORMAT;

use super::types::{DiffTarget, LogQuery};

/// `YYMMDD` to `YYYY-MM-DD`, or `None` when it is not a calendar date.
pub fn yymmdd_to_iso(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date.trim(), "%y%m%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Arguments for `git` producing output [`crate::history::parse_commit_log`] reads.
pub fn log_args(path: &str, query: &LogQuery) -> Vec<String> {
    let mut args = vec!["log".to_string()];
    args.extend(LOG_FORMAT.iter().map(|s| s.to_string()));
    if let Some(limit) = query.limit {
        args.push(format!("-n{}", limit));
    }
    if let Some(iso) = query.since.as_deref().and_then(yymmdd_to_iso) {
        args.push(format!("--since={} 00:00:00", iso));
    }
    args.push("--".to_string());
    args.push(path.to_string());
    args
}

pub fn diff_args(path: &str, target: &DiffTarget) -> Vec<String> {
    let mut args: Vec<String> = match target {
        DiffTarget::WorkingTree => vec!["diff", "-U0", "HEAD"]
            .into_iter()
            .map(String::from)
            .collect(),
        DiffTarget::Commit(hash) => vec![
            "show".to_string(),
            "--format=".to_string(),
            "-U0".to_string(),
            hash.clone(),
        ],
        DiffTarget::LastCommit => vec!["diff", "-U0", "HEAD~1", "HEAD"]
            .into_iter()
            .map(String::from)
            .collect(),
    };
    args.push("--".to_string());
    args.push(path.to_string());
    args
}

pub fn blame_args(path: &str) -> Vec<String> {
    vec!["blame".to_string(), "--line-porcelain".to_string(), "--".to_string(), path.to_string()]
}

pub fn status_args() -> Vec<String> {
    vec!["status".to_string(), "--porcelain".to_string(), "--untracked-files=no".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yymmdd_to_iso() {
        assert_eq!(yymmdd_to_iso("240615").as_deref(), Some("2024-06-15"));
        assert_eq!(yymmdd_to_iso("241332"), None);
        assert_eq!(yymmdd_to_iso("abc"), None);
    }

    #[test]
    fn test_log_args_with_bounds() {
        let args = log_args("src/a.plsql", &LogQuery { limit: Some(20), since: Some("240101".to_string()) });
        assert_eq!(args[0], "log");
        assert!(args.contains(&"-n20".to_string()));
        assert!(args.contains(&"--since=2024-01-01 00:00:00".to_string()));
        assert_eq!(&args[args.len() - 2..], ["--", "src/a.plsql"]);
    }

    #[test]
    fn test_log_args_drop_bad_since() {
        let args = log_args("a", &LogQuery::since("nope"));
        assert!(!args.iter().any(|a| a.starts_with("--since")));
    }

    #[test]
    fn test_diff_args() {
        assert_eq!(diff_args("a", &DiffTarget::WorkingTree), ["diff", "-U0", "HEAD", "--", "a"]);
        assert_eq!(
            diff_args("a", &DiffTarget::Commit("abc".to_string())),
            ["show", "--format=", "-U0", "abc", "--", "a"]
        );
        assert_eq!(diff_args("a", &DiffTarget::LastCommit), ["diff", "-U0", "HEAD~1", "HEAD", "--", "a"]);
    }
}
