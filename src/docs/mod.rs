//! Documentation regeneration through an external text generator.
//!
//! This module only shapes the request and the response; the workspace
//! session decides which commits to send and where the result goes.

pub mod types;
pub mod prompt;
pub mod retry;

pub use types::{DocGenerator, GenerationError};
pub use prompt::{
    build_prompt, clean_response, forensic_summary, ForensicCommit, MAX_FORENSIC_COMMITS,
    NO_HEADER_LOG_LIMIT,
};
pub use retry::{generate_with_retry, RetryPolicy};
