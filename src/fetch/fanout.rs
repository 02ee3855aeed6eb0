//! Bounded-concurrency fan-out with bounded retries.
//!
//! Runs many independent lookups under a hard concurrency ceiling so a
//! batch of match or profile fetches cannot blow the upstream rate
//! budget. Results always come back in input order; a failed item is a
//! `None` marker, never a batch abort.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::FetchError;

/// How transient failures are retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per item, including the first.
    pub max_attempts: u32,

    /// Fixed sleep between attempts, unless the server hinted a delay.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_millis(150),
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt; a rate-limit hint wins over the
    /// fixed delay.
    pub fn delay_for(&self, err: &FetchError) -> Duration {
        match err {
            FetchError::RateLimited {
                retry_after_secs: Some(secs),
            } => Duration::from_secs(*secs),
            _ => self.delay,
        }
    }
}

/// Run `op`, retrying transient failures per the policy.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts && err.is_transient() => {
                let delay = policy.delay_for(&err);
                debug!(
                    "Attempt {} failed ({}), retrying in {:?}",
                    attempt, err, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Fan-out executor with a counting permit of size K.
///
/// At most K lookups are in flight at any instant, globally per fetcher
/// instance. Cloning shares the permit pool.
#[derive(Clone)]
pub struct BoundedFetcher {
    semaphore: Arc<Semaphore>,
    policy: RetryPolicy,
}

impl BoundedFetcher {
    pub fn new(concurrency: usize) -> Self {
        Self::with_policy(concurrency, RetryPolicy::default())
    }

    pub fn with_policy(concurrency: usize, policy: RetryPolicy) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute `op` for every input. Returns exactly one slot per input,
    /// in input order; items that still fail after retries become `None`.
    pub async fn run<I, T, F, Fut>(&self, inputs: Vec<I>, op: F) -> Vec<Option<T>>
    where
        I: Clone + Send + Sync + 'static,
        T: Send + 'static,
        F: Fn(I) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let mut handles = Vec::with_capacity(inputs.len());

        for input in inputs {
            let semaphore = Arc::clone(&self.semaphore);
            let policy = self.policy.clone();
            let op = op.clone();

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };

                match with_retry(&policy, || op(input.clone())).await {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!("Fan-out item failed after retries: {}", err);
                        None
                    }
                }
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(err) => {
                    warn!("Fan-out task panicked: {}", err);
                    results.push(None);
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_results_keep_input_order_with_failures() {
        let fetcher = BoundedFetcher::with_policy(3, fast_policy());
        let inputs: Vec<u32> = (0..10).collect();

        let results = fetcher
            .run(inputs, |i: u32| async move {
                if i == 3 || i == 7 {
                    Err(FetchError::NotFound)
                } else {
                    Ok(i * 2)
                }
            })
            .await;

        assert_eq!(results.len(), 10);
        assert_eq!(results[3], None);
        assert_eq!(results[7], None);
        for i in [0usize, 1, 2, 4, 5, 6, 8, 9] {
            assert_eq!(results[i], Some(i as u32 * 2));
        }
    }

    #[tokio::test]
    async fn test_concurrency_ceiling_is_enforced() {
        let fetcher = BoundedFetcher::with_policy(3, fast_policy());
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let op = {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            move |_i: u32| {
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                async move {
                    let in_flight = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(in_flight, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok::<u32, FetchError>(1)
                }
            }
        };

        let results = fetcher.run((0..12).collect(), op).await;

        assert_eq!(results.iter().filter(|r| r.is_some()).count(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_with_retry_recovers_from_transient_error() {
        let attempts = Arc::new(AtomicUsize::new(0));

        let result = with_retry(&fast_policy(), || {
            let attempts = Arc::clone(&attempts);
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(FetchError::Timeout)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_with_retry_does_not_retry_permanent_errors() {
        let attempts = Arc::new(AtomicUsize::new(0));

        let result: Result<u32, FetchError> = with_retry(&fast_policy(), || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::NotFound)
            }
        })
        .await;

        assert!(matches!(result, Err(FetchError::NotFound)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_after_max_attempts() {
        let attempts = Arc::new(AtomicUsize::new(0));

        let result: Result<u32, FetchError> = with_retry(&fast_policy(), || {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Timeout)
            }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Timeout)));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rate_limit_hint_overrides_fixed_delay() {
        let policy = RetryPolicy::default();

        let hinted = FetchError::RateLimited {
            retry_after_secs: Some(3),
        };
        assert_eq!(policy.delay_for(&hinted), Duration::from_secs(3));

        let unhinted = FetchError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(policy.delay_for(&unhinted), Duration::from_millis(150));
        assert_eq!(
            policy.delay_for(&FetchError::Timeout),
            Duration::from_millis(150)
        );
    }
}
