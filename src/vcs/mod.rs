//! The version-control collaborator.
//!
//! The host runs `git` (or anything else) and hands results back through
//! [`VersionControl`]. Argument builders for the expected output formats live
//! in [`args`].

pub mod types;
pub mod args;
pub mod status;

use async_trait::async_trait;

use crate::blame::BlameLine;
use crate::history::CommitInfo;

pub use types::{DiffTarget, LogQuery, VcsError};
pub use args::{blame_args, diff_args, log_args, status_args, yymmdd_to_iso};
pub use status::parse_status_porcelain;

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Commits touching `path`, newest first.
    async fn log(&self, path: &str, query: &LogQuery) -> Result<Vec<CommitInfo>, VcsError>;

    /// Zero-context unified diff for `path`. Empty when nothing changed.
    async fn diff(&self, path: &str, target: &DiffTarget) -> Result<String, VcsError>;

    async fn blame(&self, path: &str) -> Result<Vec<BlameLine>, VcsError>;

    /// Workspace-relative paths with uncommitted changes.
    async fn uncommitted_paths(&self) -> Result<Vec<String>, VcsError>;

    async fn is_dirty(&self, path: &str) -> Result<bool, VcsError> {
        Ok(self.uncommitted_paths().await?.iter().any(|p| p == path))
    }
}
