use tracing::debug;

use crate::history::CommitInfo;

/// Drop commits whose subject mentions any skip keyword (case-insensitive).
///
/// Used to keep merge, formatting, or documentation commits out of labels and
/// history scans.
pub fn filter_skipped_commits(commits: Vec<CommitInfo>, skip_keywords: &[String]) -> Vec<CommitInfo> {
    if skip_keywords.iter().all(|k| k.trim().is_empty()) {
        return commits;
    }

    commits
        .into_iter()
        .filter(|c| {
            let skipped = skip_keywords.iter().any(|k| c.subject_mentions(k.trim()));
            if skipped {
                debug!(hash = %c.hash, subject = %c.subject, "commit skipped by keyword");
            }
            !skipped
        })
        .collect()
}
