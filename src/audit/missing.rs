use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::attribution::{dates::code_body, marker_dates};
use crate::config::ScanMode;
use crate::filter::{filter_commits_by_date, filter_skipped_commits};
use crate::header::{history_dates, HEADER_SCAN_BYTES};
use crate::vcs::{LogQuery, VersionControl};

use super::types::MissingDates;

/// What a missing-date scan compares commit dates against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FindingKind {
    /// `[ADD|MOD-YYMMDD-n]` labels in the code body.
    Marker,
    /// Entries in the header history.
    Documentation,
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::Marker => f.write_str("Marker"),
            FindingKind::Documentation => f.write_str("Documentation"),
        }
    }
}

/// The header part of a file: everything up to the boundary line, or the
/// first [`HEADER_SCAN_BYTES`] when there is no usable boundary.
pub fn header_text<'a>(content: &'a str, boundary: Option<&Regex>) -> &'a str {
    let body = code_body(content, boundary);
    if body.len() < content.len() {
        return &content[..content.len() - body.len()];
    }
    let mut end = content.len().min(HEADER_SCAN_BYTES);
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

/// Dates recorded in the file for `kind`, ascending and unique.
pub fn recorded_dates(content: &str, kind: FindingKind, boundary: Option<&Regex>) -> Vec<String> {
    match kind {
        FindingKind::Marker => marker_dates(content, boundary),
        FindingKind::Documentation => {
            let dates: BTreeSet<String> = history_dates(header_text(content, boundary)).into_iter().collect();
            dates.into_iter().collect()
        }
    }
}

/// Commit dates (after skip-keyword filtering) that the file does not record.
///
/// In incremental mode only commits since the newest recorded date are
/// queried. Returns `None` when nothing is missing or history is unavailable.
pub async fn scan_missing_dates<V>(
    vcs: &V,
    path: &str,
    content: &str,
    kind: FindingKind,
    scan_mode: ScanMode,
    skip_keywords: &[String],
    boundary: Option<&Regex>,
) -> Option<MissingDates>
where
    V: VersionControl + ?Sized,
{
    let recorded = recorded_dates(content, kind, boundary);

    let query = match (scan_mode, recorded.last()) {
        (ScanMode::Incremental, Some(last)) => LogQuery::since(last.clone()),
        _ => LogQuery::default(),
    };

    let commits = match vcs.log(path, &query).await {
        Ok(c) => c,
        Err(e) => {
            warn!(path, %kind, error = %e, "history unavailable for missing-date scan");
            return None;
        }
    };

    // `--since` bounds by committer date; the log reports author dates.
    let commits = filter_commits_by_date(commits, query.since.as_deref(), None);
    let missing: BTreeSet<String> = filter_skipped_commits(commits, skip_keywords)
        .into_iter()
        .map(|c| c.date)
        .filter(|d| !recorded.contains(d))
        .collect();

    if missing.is_empty() {
        return None;
    }

    let dates: Vec<String> = missing.into_iter().collect();
    debug!(path, %kind, count = dates.len(), "dates missing");
    Some(MissingDates {
        file_path: path.to_string(),
        reason: format!("Missing {} for dates: {}", kind, dates.join(", ")),
        dates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::analyze::tests::FakeVcs;

    const FILE: &str = "--  240301  ERW  [SC-2] Totals\n\
                        --  240101  ERW  [SC-1] Created\n\
                        ---------- END\n\
                        v_a := 1; -- [MOD-240301-1] Eve\n";

    fn vcs() -> FakeVcs {
        FakeVcs::default().with_log(
            "a",
            vec![
                FakeVcs::commit("h4", "240615", "Eve", "SC-4 rounding"),
                FakeVcs::commit("h3", "240501", "Eve", "merge main"),
                FakeVcs::commit("h2", "240301", "Eve", "SC-2 totals"),
                FakeVcs::commit("h1", "240101", "Eve", "SC-1 created"),
            ],
        )
    }

    #[test]
    fn test_recorded_dates() {
        let boundary = Regex::new("END").unwrap();
        assert_eq!(recorded_dates(FILE, FindingKind::Marker, Some(&boundary)), vec!["240301"]);
        assert_eq!(
            recorded_dates(FILE, FindingKind::Documentation, Some(&boundary)),
            vec!["240101", "240301"]
        );
        assert_eq!(
            recorded_dates(FILE, FindingKind::Documentation, None),
            vec!["240101", "240301"]
        );
    }

    #[tokio::test]
    async fn test_full_scan_reports_all_missing_dates() {
        let boundary = Regex::new("END").unwrap();
        let skip = vec!["merge".to_string()];
        let found = scan_missing_dates(&vcs(), "a", FILE, FindingKind::Marker, ScanMode::Full, &skip, Some(&boundary))
            .await
            .unwrap();
        assert_eq!(found.dates, vec!["240101", "240615"]);
        assert_eq!(found.reason, "Missing Marker for dates: 240101, 240615");
    }

    #[tokio::test]
    async fn test_incremental_scan_starts_at_last_recorded_date() {
        let boundary = Regex::new("END").unwrap();
        let vcs = vcs();
        let found = scan_missing_dates(&vcs, "a", FILE, FindingKind::Marker, ScanMode::Incremental, &[], Some(&boundary))
            .await
            .unwrap();
        assert_eq!(found.dates, vec!["240501", "240615"]);
        assert_eq!(vcs.log_calls.lock().unwrap()[0].1, LogQuery::since("240301"));
    }

    #[tokio::test]
    async fn test_incremental_scan_ignores_older_author_dates() {
        let boundary = Regex::new("END").unwrap();
        // Rebased commits pass `--since` by committer date but carry older author dates.
        let vcs = FakeVcs {
            ignore_since: true,
            ..FakeVcs::default()
        }
        .with_log(
            "a",
            vec![
                FakeVcs::commit("h2", "240301", "Eve", "SC-2 totals"),
                FakeVcs::commit("h1", "240101", "Eve", "SC-1 rebased"),
            ],
        );

        let found =
            scan_missing_dates(&vcs, "a", FILE, FindingKind::Marker, ScanMode::Incremental, &[], Some(&boundary)).await;
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn test_nothing_missing() {
        let content = "--  240615  ERW  x\n--  240301  E  y\n--  240101  E  z\n";
        let skip = vec!["merge".to_string()];
        let found =
            scan_missing_dates(&vcs(), "a", content, FindingKind::Documentation, ScanMode::Full, &skip, None).await;
        assert_eq!(found, None);
    }
}
