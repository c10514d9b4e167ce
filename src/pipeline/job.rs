// src/pipeline/job.rs

//! Retryable unit of work wrapping one fetch cycle.
//!
//! The core performs no retries; this wrapper owns the bounded attempt
//! count, the growing backoff between attempts, and the per-attempt
//! wall-clock timeout. A timed-out attempt is abandoned, not cancelled
//! cooperatively.

use std::time::Duration;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{RetryConfig, Source};
use crate::services::AggregatorService;
use crate::services::sources::{FetchFilters, SourceAdapter};
use crate::storage::SourceRegistry;

/// Bounded retry behavior for fetch jobs.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts before giving up
    pub max_attempts: u32,

    /// Delay before retry n; the last entry repeats when exceeded
    pub backoff: Vec<Duration>,

    /// Wall-clock cap on a single attempt
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(retry: &RetryConfig) -> Self {
        Self {
            max_attempts: retry.max_attempts,
            backoff: retry
                .backoff_secs
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
            attempt_timeout: Duration::from_secs(retry.attempt_timeout_secs),
        }
    }

    /// Backoff applied after the given (1-based) failed attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if self.backoff.is_empty() {
            return Duration::ZERO;
        }
        let index = (attempt as usize - 1).min(self.backoff.len() - 1);
        self.backoff[index]
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Pure retry decision: a function of the attempt number and error kind.
pub fn decide(policy: &RetryPolicy, attempt: u32, error: &AppError) -> RetryDecision {
    if !error.is_retryable() || attempt >= policy.max_attempts {
        RetryDecision::GiveUp
    } else {
        RetryDecision::RetryAfter(policy.backoff_for(attempt))
    }
}

/// Drive attempts of a fallible operation under the policy.
///
/// Each attempt is capped by the policy's timeout; a timeout counts as a
/// retryable transport failure.
pub async fn run_with_retry<F, Fut>(policy: &RetryPolicy, label: &str, mut attempt_fn: F) -> Result<u64>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<u64>>,
{
    let mut attempt: u32 = 1;
    loop {
        let result = match tokio::time::timeout(policy.attempt_timeout, attempt_fn(attempt)).await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(label, policy.attempt_timeout)),
        };

        let error = match result {
            Ok(count) => return Ok(count),
            Err(error) => error,
        };

        match decide(policy, attempt, &error) {
            RetryDecision::GiveUp => {
                log::error!(
                    "Failed to fetch from {label} after {attempt} attempt(s): {error}"
                );
                return Err(error);
            }
            RetryDecision::RetryAfter(delay) => {
                log::warn!(
                    "Attempt {attempt} for {label} failed: {error}. Retrying in {}s",
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// One retryable fetch cycle for one source.
pub struct FetchJob {
    source: Source,
    adapter: SourceAdapter,
    filters: FetchFilters,
    policy: RetryPolicy,
}

impl FetchJob {
    pub fn new(
        source: Source,
        adapter: SourceAdapter,
        filters: FetchFilters,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            adapter,
            filters,
            policy,
        }
    }

    /// Run the cycle to completion (or exhausted retries), then stamp the
    /// source's last fetch time.
    pub async fn run(
        &self,
        service: &AggregatorService,
        registry: &dyn SourceRegistry,
    ) -> Result<u64> {
        let count = run_with_retry(&self.policy, &self.source.name, |_attempt| {
            service.fetch_from(&self.adapter, &self.filters)
        })
        .await?;

        registry.mark_fetched(&self.source.slug, Utc::now()).await?;

        log::info!("Fetched {count} new articles from {}", self.source.name);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: vec![Duration::ZERO],
            attempt_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn policy_from_config_defaults() {
        let policy = RetryPolicy::from_config(&RetryConfig::default());
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_for(1), Duration::from_secs(60));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(300));
        assert_eq!(policy.backoff_for(3), Duration::from_secs(900));
        // Past the schedule, the last entry repeats.
        assert_eq!(policy.backoff_for(7), Duration::from_secs(900));
        assert_eq!(policy.attempt_timeout, Duration::from_secs(120));
    }

    #[test]
    fn decide_retries_transient_errors_until_exhausted() {
        let policy = RetryPolicy::from_config(&RetryConfig::default());
        let error = AppError::transport("NewsAPI", 503, None);

        assert_eq!(
            decide(&policy, 1, &error),
            RetryDecision::RetryAfter(Duration::from_secs(60))
        );
        assert_eq!(
            decide(&policy, 2, &error),
            RetryDecision::RetryAfter(Duration::from_secs(300))
        );
        assert_eq!(decide(&policy, 3, &error), RetryDecision::GiveUp);
    }

    #[test]
    fn decide_never_retries_configuration_errors() {
        let policy = RetryPolicy::from_config(&RetryConfig::default());
        assert_eq!(
            decide(&policy, 1, &AppError::config("missing key")),
            RetryDecision::GiveUp
        );
        assert_eq!(
            decide(
                &policy,
                1,
                &AppError::UnsupportedSource { slug: "bbc".into() }
            ),
            RetryDecision::GiveUp
        );
    }

    #[tokio::test]
    async fn retry_driver_recovers_after_transient_failures() {
        let attempts = AtomicU32::new(0);
        let result = run_with_retry(&quick_policy(3), "test", |_| {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(AppError::transport("test", 503, None))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_driver_returns_last_error_when_exhausted() {
        let attempts = AtomicU32::new(0);
        let result: Result<u64> = run_with_retry(&quick_policy(2), "test", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::provider("test", "down")) }
        })
        .await;

        assert!(matches!(result, Err(AppError::Provider { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_driver_stops_on_fatal_error() {
        let attempts = AtomicU32::new(0);
        let result: Result<u64> = run_with_retry(&quick_policy(3), "test", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::config("bad")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_driver_times_out_stuck_attempts() {
        let policy = RetryPolicy {
            max_attempts: 2,
            backoff: vec![Duration::ZERO],
            attempt_timeout: Duration::from_millis(20),
        };

        let result: Result<u64> = run_with_retry(&policy, "test", |_| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(1)
        })
        .await;

        match result {
            Err(AppError::Transport { status, .. }) => assert!(status.is_none()),
            other => panic!("expected timeout transport error, got {other:?}"),
        }
    }
}
