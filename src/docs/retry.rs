use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::types::{DocGenerator, GenerationError};

/// Bounded exponential backoff for documentation requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay before retry number `attempt + 1`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64;
        let exponential = base * self.backoff_multiplier.powi(attempt as i32);
        let capped = exponential.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }
}

/// Call `generator` until it succeeds, fails permanently, runs out of attempts,
/// or `cancel` is raised.
///
/// `cancel` is only checked between attempts; an in-flight request is never
/// interrupted.
pub async fn generate_with_retry<G>(
    generator: &G,
    model: &str,
    prompt: &str,
    policy: &RetryPolicy,
    cancel: &AtomicBool,
) -> Result<String, GenerationError>
where
    G: DocGenerator + ?Sized,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_error = GenerationError::Empty;

    for attempt in 0..attempts {
        if cancel.load(Ordering::Relaxed) {
            return Err(GenerationError::Cancelled);
        }

        debug!(attempt = attempt + 1, of = attempts, model, chars = prompt.len(), "requesting documentation");

        match generator.generate(model, prompt).await {
            Ok(text) if text.trim().is_empty() => return Err(GenerationError::Empty),
            Ok(text) => {
                if attempt > 0 {
                    info!(retries = attempt, "documentation request recovered");
                }
                return Ok(text);
            }
            Err(error) if !error.is_retryable() => {
                warn!(%error, "documentation request failed permanently");
                return Err(error);
            }
            Err(error) => {
                if attempt + 1 == attempts {
                    warn!(%error, attempts, "documentation request out of retries");
                    return Err(error);
                }
                let delay = policy.delay_for(attempt);
                warn!(%error, attempt = attempt + 1, ?delay, "documentation request failed, retrying");
                last_error = error;
                tokio::time::sleep(delay).await;
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Replays scripted responses in order.
    struct Scripted {
        responses: Mutex<Vec<Result<String, GenerationError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<String, GenerationError>>) -> Self {
            responses.reverse();
            Scripted {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl DocGenerator for Scripted {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, GenerationError> {
            *self.calls.lock().unwrap() += 1;
            self.responses.lock().unwrap().pop().unwrap_or(Err(GenerationError::Empty))
        }
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RetryPolicy::default().with_max_delay(Duration::from_secs(5));
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(5));
        assert_eq!(policy.delay_for(10), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_success() {
        let generator = Scripted::new(vec![
            Err(GenerationError::RateLimited),
            Err(GenerationError::RateLimited),
            Ok("done".to_string()),
        ]);
        let start = Instant::now();
        let result = generate_with_retry(&generator, "m", "p", &RetryPolicy::default(), &AtomicBool::new(false)).await;
        assert_eq!(result, Ok("done".to_string()));
        assert_eq!(generator.calls(), 3);
        // 2s + 4s of backoff on the paused clock.
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_budget() {
        let generator = Scripted::new(vec![
            Err(GenerationError::Transport("reset".to_string())),
            Err(GenerationError::RateLimited),
            Ok("too late".to_string()),
        ]);
        let policy = RetryPolicy::default().with_max_attempts(2);
        let result = generate_with_retry(&generator, "m", "p", &policy, &AtomicBool::new(false)).await;
        assert_eq!(result, Err(GenerationError::RateLimited));
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_retried() {
        for error in [GenerationError::Truncated, GenerationError::ContentFiltered("SAFETY".to_string())] {
            let generator = Scripted::new(vec![Err(error.clone()), Ok("x".to_string())]);
            let result = generate_with_retry(&generator, "m", "p", &RetryPolicy::default(), &AtomicBool::new(false)).await;
            assert_eq!(result, Err(error));
            assert_eq!(generator.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_blank_text_is_empty() {
        let generator = Scripted::new(vec![Ok("  \n".to_string())]);
        let result = generate_with_retry(&generator, "m", "p", &RetryPolicy::default(), &AtomicBool::new(false)).await;
        assert_eq!(result, Err(GenerationError::Empty));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let generator = Scripted::new(vec![Ok("x".to_string())]);
        let result = generate_with_retry(&generator, "m", "p", &RetryPolicy::default(), &AtomicBool::new(true)).await;
        assert_eq!(result, Err(GenerationError::Cancelled));
        assert_eq!(generator.calls(), 0);
    }
}
