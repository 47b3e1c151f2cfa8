//! Transport-level retries for GitHub calls.
//!
//! Only `reqwest` transport failures (refused connections, resets, request
//! timeouts) are retried. Any HTTP response, including 4xx/5xx, is handed
//! back to the caller untouched so rate-limit and auth failures surface at
//! once.

use std::time::Duration;

/// Backoff schedule for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Run `send` until it yields a response or the policy is exhausted.
pub(crate) async fn retry_send<F, Fut>(
    policy: RetryPolicy,
    endpoint: &str,
    send: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match send().await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < policy.max_retries => {
                let delay = policy.delay(attempt);
                attempt += 1;
                tracing::warn!(
                    endpoint,
                    attempt,
                    max_retries = policy.max_retries,
                    "GitHub request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
