//! Retry-with-backoff decorator around any [`ResponsesApi`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde_json::{Map, Value};

use crate::client::{ApiResult, ResponsesApi};

/// Retry policy for failed requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
    pub max_backoff: Duration,
    /// Spread each delay by ±25%.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Defaults overridden by `LEXBRIDGE_RETRY_MAX` / `LEXBRIDGE_RETRY_INITIAL_MS`.
    pub fn from_env() -> Self {
        let mut policy = Self::default();
        if let Some(n) = crate::util::env_parse::<u32>("LEXBRIDGE_RETRY_MAX") {
            policy.max_retries = n;
        }
        if let Some(ms) = crate::util::env_parse::<u64>("LEXBRIDGE_RETRY_INITIAL_MS") {
            policy.initial_backoff = Duration::from_millis(ms);
        }
        policy
    }

    /// Delay before retry number `attempt` (0-based), before jitter.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.max(1.0).powi(attempt as i32);
        let millis = self.initial_backoff.as_millis() as f64 * factor;
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.backoff_for_attempt(attempt);
        if !self.jitter || base.is_zero() {
            return base;
        }
        let spread = rand::thread_rng().gen_range(0.75..=1.25);
        base.mul_f64(spread)
    }
}

/// True for the rate-limit signature: HTTP 429, or error text that says so.
pub fn is_rate_limited(result: &ApiResult) -> bool {
    match result {
        ApiResult::Success { .. } => false,
        ApiResult::Failure { status: Some(429), .. } => true,
        ApiResult::Failure { error, .. } => {
            let lower = error.to_ascii_lowercase();
            lower.contains("rate limit")
                || lower.contains("rate_limit")
                || lower.contains("too many requests")
        }
    }
}

type RetryPredicate = Arc<dyn Fn(&ApiResult) -> bool + Send + Sync>;

/// Wraps a caller and re-issues the call while the predicate holds.
pub struct Retrying<C> {
    inner: C,
    policy: RetryPolicy,
    should_retry: RetryPredicate,
}

impl<C: ResponsesApi> Retrying<C> {
    /// Retry on [`is_rate_limited`].
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self::with_predicate(inner, policy, is_rate_limited)
    }

    pub fn with_predicate<F>(inner: C, policy: RetryPolicy, predicate: F) -> Self
    where
        F: Fn(&ApiResult) -> bool + Send + Sync + 'static,
    {
        Self {
            inner,
            policy,
            should_retry: Arc::new(predicate),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: ResponsesApi> ResponsesApi for Retrying<C> {
    async fn create(&self, params: &Map<String, Value>) -> ApiResult {
        let mut attempt = 0u32;
        loop {
            let result = self.inner.create(params).await;
            if attempt >= self.policy.max_retries || !(self.should_retry)(&result) {
                return result;
            }
            let delay = self.policy.delay_for_attempt(attempt);
            tracing::warn!(
                attempt = attempt + 1,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                status = ?result.status(),
                "retrying Responses API call"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_caps() {
        let p = RetryPolicy {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_millis(350),
            jitter: false,
        };
        assert_eq!(p.backoff_for_attempt(0), Duration::from_millis(100));
        assert_eq!(p.backoff_for_attempt(1), Duration::from_millis(200));
        assert_eq!(p.backoff_for_attempt(2), Duration::from_millis(350));
        assert_eq!(p.backoff_for_attempt(9), Duration::from_millis(350));
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        let p = RetryPolicy {
            initial_backoff: Duration::from_millis(1000),
            ..RetryPolicy::default()
        };
        for _ in 0..50 {
            let d = p.delay_for_attempt(0).as_millis();
            assert!((750..=1250).contains(&d), "{d}");
        }
    }

    #[test]
    fn policy_reads_env_overrides() {
        std::env::remove_var("LEXBRIDGE_RETRY_MAX");
        std::env::remove_var("LEXBRIDGE_RETRY_INITIAL_MS");
        assert_eq!(RetryPolicy::from_env(), RetryPolicy::default());

        std::env::set_var("LEXBRIDGE_RETRY_MAX", "5");
        std::env::set_var("LEXBRIDGE_RETRY_INITIAL_MS", "not-a-number");
        let p = RetryPolicy::from_env();
        assert_eq!(p.max_retries, 5);
        assert_eq!(p.initial_backoff, Duration::from_millis(500));

        std::env::set_var("LEXBRIDGE_RETRY_INITIAL_MS", "50");
        assert_eq!(RetryPolicy::from_env().initial_backoff, Duration::from_millis(50));

        std::env::remove_var("LEXBRIDGE_RETRY_MAX");
        std::env::remove_var("LEXBRIDGE_RETRY_INITIAL_MS");
    }

    #[test]
    fn rate_limit_signature() {
        assert!(is_rate_limited(&ApiResult::failure("x", Some(429))));
        assert!(is_rate_limited(&ApiResult::failure(
            "Rate limit reached for gpt-4.1",
            Some(400)
        )));
        assert!(is_rate_limited(&ApiResult::failure(
            "code: rate_limit_exceeded",
            None
        )));
        assert!(!is_rate_limited(&ApiResult::failure("server error", Some(500))));
        assert!(!is_rate_limited(&ApiResult::Success {
            raw: serde_json::json!({}),
            text: None
        }));
    }
}
