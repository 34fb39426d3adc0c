use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bounds for a history query. Both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    /// Newest `limit` commits only.
    pub limit: Option<usize>,
    /// Commits on or after this `YYMMDD` date.
    pub since: Option<String>,
}

impl LogQuery {
    pub fn latest(limit: usize) -> Self {
        LogQuery {
            limit: Some(limit),
            since: None,
        }
    }

    pub fn since(date: impl Into<String>) -> Self {
        LogQuery {
            limit: None,
            since: Some(date.into()),
        }
    }
}

/// Which change a diff request describes. Diffs always use zero context lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "hash")]
pub enum DiffTarget {
    /// Working tree against `HEAD`.
    WorkingTree,
    /// The change a specific commit made to the path.
    Commit(String),
    /// `HEAD` against its parent.
    LastCommit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VcsError {
    #[error("not inside a repository")]
    NotARepository,
    #[error("no history for {0}")]
    NoHistory(String),
    #[error("`{command}` failed: {message}")]
    Command { command: String, message: String },
}
