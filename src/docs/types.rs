use async_trait::async_trait;
use thiserror::Error;

/// Why the documentation service produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("rate limited by the documentation service")]
    RateLimited,
    #[error("response blocked by content filter: {0}")]
    ContentFiltered(String),
    /// Output hit the token limit; a partial file must never be written back.
    #[error("response truncated at the output limit")]
    Truncated,
    #[error("service returned no content")]
    Empty,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Only rate limits and transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerationError::RateLimited | GenerationError::Transport(_))
    }
}

/// The black-box text generator behind documentation updates.
///
/// Implementations own the transport; the caller picks the model and owns
/// retries (see [`super::generate_with_retry`]).
#[async_trait]
pub trait DocGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}
