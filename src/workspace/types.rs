use serde::{Deserialize, Serialize};

/// A file handed in by the host: workspace-relative path plus current content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        SourceFile {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Last path component, for prompts and log lines.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

/// One entry of the problems list shown by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub file_path: String,
    pub label: String,
    pub severity: Severity,
    pub reason: String,
}

/// Aggregate counts for a batch. Every input file lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped + self.cancelled
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    /// Errors first, then warnings; file order within each.
    pub findings: Vec<Finding>,
    /// Files left out because they have uncommitted changes.
    pub uncommitted: Vec<String>,
    pub summary: BatchReport,
}

/// New content for a file, for the host to write or show as a diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedFile {
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutput {
    pub summary: BatchReport,
    /// Write `files` directly instead of offering them for review.
    pub auto_apply: bool,
    pub files: Vec<UpdatedFile>,
}

/// Result of fixing markers for one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum FixOutcome {
    /// Neither the working tree nor the last commit changed the file.
    NoChanges,
    /// Every change is already marked.
    Unchanged,
    #[serde(rename_all = "camelCase")]
    Patched {
        content: String,
        ticket_id: String,
        sign: String,
    },
}

/// Result of regenerating documentation for one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "content")]
pub enum DocOutcome {
    /// No commits since the header date.
    Skipped,
    Generated(String),
}
