use thiserror::Error;

use crate::docs::GenerationError;

/// Errors surfaced by the configuration layer and the workspace session.
///
/// The pure text operations (diff parsing, marker reconciliation, header
/// patching) never produce these: malformed input there degrades to a no-op.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A user-supplied regular expression (rule `startRegex`) failed to compile.
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A file glob in the settings failed to compile.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Settings or payload JSON could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Another operation is already running on this path.
    #[error("an operation is already in flight for {0}")]
    PathBusy(String),

    /// No marker rule matches the file.
    #[error("no marker rule matches {0}")]
    NoRule(String),

    /// Documentation was requested but no generator is attached to the session.
    #[error("documentation service is not configured")]
    NoGenerator,

    /// The documentation service gave up on this file.
    #[error("documentation generation failed: {0}")]
    Generation(#[from] GenerationError),
}

pub type CoreResult<T> = Result<T, CoreError>;
