use serde::{Deserialize, Serialize};

/// Attribution of one physical line of the current file, from
/// `git blame --porcelain` / `--line-porcelain` output.
///
/// `hash` and `author` are `None` for lines not yet committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLine {
    pub line: u32,
    pub hash: Option<String>,
    pub author: Option<String>,
    pub content: String,
}
