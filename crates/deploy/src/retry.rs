//! Exponential backoff for registry push retries.

use std::time::{Duration, Instant};

use rand::Rng;

/// Parameters governing a retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub factor: u32,
    /// Maximum number of attempts, including the first.
    pub max_attempts: usize,
    /// Stop retrying once this much wall-clock time has elapsed.
    pub max_elapsed: Duration,
    /// Jitter fraction applied symmetrically to each computed delay.
    pub jitter: f64,
}

impl Default for RetryConfig {
    /// 500ms initial delay, factor 2, ±20% jitter, 5 attempts, 60s ceiling.
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            factor: 2,
            max_attempts: 5,
            max_elapsed: Duration::from_secs(60),
            jitter: 0.2,
        }
    }
}

/// Retry `f` under `config`, only for errors where `is_transient` returns
/// true. Returns the first success, the first non-transient error, or the
/// last error once attempts or elapsed time run out.
pub async fn retry_with_backoff<T, E, F, Fut>(
    config: RetryConfig,
    is_transient: impl Fn(&E) -> bool,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let mut delay = config.initial_delay;
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(v) => return Ok(v),
            Err(e)
                if attempt < config.max_attempts
                    && is_transient(&e)
                    && start.elapsed() < config.max_elapsed =>
            {
                let jittered = jitter(delay, config.jitter);
                tracing::warn!(
                    attempt,
                    delay_ms = jittered.as_millis() as u64,
                    "retrying after transient error"
                );
                tokio::time::sleep(jittered).await;
                delay *= config.factor;
            }
            Err(e) => return Err(e),
        }
    }
}

fn jitter(delay: Duration, jitter: f64) -> Duration {
    let mut rng = rand::thread_rng();
    let factor = 1.0 + rng.gen_range(-jitter..=jitter);
    Duration::from_secs_f64((delay.as_secs_f64() * factor).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_config(max_attempts: usize) -> RetryConfig {
        RetryConfig {
            initial_delay: Duration::from_millis(1),
            factor: 2,
            max_attempts,
            max_elapsed: Duration::from_secs(5),
            jitter: 0.2,
        }
    }

    #[tokio::test]
    async fn succeeds_without_retry_when_first_attempt_succeeds() {
        let result: Result<i32, &str> =
            retry_with_backoff(fast_config(5), |_| true, || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn gives_up_immediately_on_non_transient_error() {
        let calls = AtomicUsize::new(0);
        let result: Result<i32, &str> = retry_with_backoff(
            fast_config(5),
            |_| false,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("permanent") }
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_up_to_the_attempt_cap() {
        let calls = AtomicUsize::new(0);
        let result: Result<i32, &str> = retry_with_backoff(
            fast_config(3),
            |_| true,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("transient") }
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
