use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::history::CommitInfo;

/// Human-readable attribution for a commit: `{type}-{YYMMDD}-{n}` plus author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribution {
    pub label: String,
    pub author: String,
}

/// Assign a label to every commit, keyed by commit hash.
///
/// `commits` is expected newest first, as git prints them. Labels are counted
/// oldest first, so the earliest commit of a day gets index 1. Stability across
/// runs is only as good as the order the history query returns.
pub fn build_commit_labels(commits: &[CommitInfo]) -> HashMap<String, Attribution> {
    let mut per_date: HashMap<&str, u32> = HashMap::new();
    let mut labels = HashMap::with_capacity(commits.len());

    for commit in commits.iter().rev() {
        let counter = per_date.entry(commit.date.as_str()).or_insert(0);
        *counter += 1;

        labels.insert(
            commit.hash.clone(),
            Attribution {
                label: format!("{}-{}-{}", commit.kind, commit.date, counter),
                author: commit.author.clone(),
            },
        );
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::CommitType;

    fn commit(hash: &str, date: &str, kind: CommitType) -> CommitInfo {
        CommitInfo {
            hash: hash.to_string(),
            date: date.to_string(),
            author: format!("author-{}", hash),
            subject: String::new(),
            kind,
        }
    }

    #[test]
    fn test_same_day_commits_numbered_oldest_first() {
        let commits = vec![
            commit("c3", "240615", CommitType::Mod),
            commit("c2", "240615", CommitType::Mod),
            commit("c1", "240101", CommitType::Add),
        ];
        let labels = build_commit_labels(&commits);
        assert_eq!(labels["c1"].label, "ADD-240101-1");
        assert_eq!(labels["c2"].label, "MOD-240615-1");
        assert_eq!(labels["c3"].label, "MOD-240615-2");
        assert_eq!(labels["c3"].author, "author-c3");
    }

    #[test]
    fn test_empty_history() {
        assert!(build_commit_labels(&[]).is_empty());
    }
}
