use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a commit created the file or modified it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommitType {
    Add,
    Mod,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Add => "ADD",
            CommitType::Mod => "MOD",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One commit that touched the file, as reported by the history query.
///
/// `date` is always normalized to `YYMMDD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    pub hash: String,
    pub date: String,
    pub author: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: CommitType,
}

impl CommitInfo {
    /// Subject check used by skip keywords: case-insensitive substring match.
    pub fn subject_mentions(&self, keyword: &str) -> bool {
        !keyword.is_empty() && self.subject.to_uppercase().contains(&keyword.to_uppercase())
    }
}
