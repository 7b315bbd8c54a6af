//! Module containing the [Retry] capability, used by the
//! [Dispatcher][crate::Dispatcher] to execute request handlers under
//! a retry policy.
//!
//! The [Dispatcher][crate::Dispatcher] makes no retry decision on its own:
//! how many attempts are made, which failures are retried and how long to
//! wait in between is entirely up to the [Retry] implementation.
//!
//! Two interchangeable implementations are provided:
//!
//! * [Retriable], pairing a [Strategy] (how many attempts, how long to wait)
//!   with a [Policy] (which failures can be retried),
//! * [`RetryPolicy`], a single policy object configured through a fluent API.

mod config;
mod policy;
mod strategy;
mod unified;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

pub use config::Config;
pub use policy::{AnyError, Policy};
pub use strategy::{Count, Linear, Strategy};
pub use unified::RetryPolicy;

/// Executes a zero-argument asynchronous operation with retry semantics,
/// returning its eventual result or its final failure.
///
/// The operation can be invoked any number of times, each invocation
/// producing a new attempt.
pub trait Retry<E>: Send + Sync {
    /// Runs `operation`, retrying it according to the implementation's policy.
    ///
    /// # Errors
    ///
    /// Returns the failure surfaced by the implementation once it stops
    /// retrying, usually the one produced by the last attempt.
    fn retry<'a, T, F, Fut>(&'a self, operation: F) -> BoxFuture<'a, Result<T, E>>
    where
        T: Send + 'a,
        E: 'a,
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a;
}

impl<E, R> Retry<E> for Arc<R>
where
    R: Retry<E>,
{
    fn retry<'a, T, F, Fut>(&'a self, operation: F) -> BoxFuture<'a, Result<T, E>>
    where
        T: Send + 'a,
        E: 'a,
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        (**self).retry(operation)
    }
}

/// [Retry] implementation combining a [Strategy], deciding the number of
/// attempts and the wait between them, with a [Policy], deciding which
/// failures can be retried.
#[derive(Debug, Clone, Copy)]
pub struct Retriable<S, P = AnyError> {
    strategy: S,
    policy: P,
}

impl<S> Retriable<S>
where
    S: Strategy,
{
    /// Creates a new [Retriable] instance retrying every failure.
    #[must_use]
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            policy: AnyError,
        }
    }
}

impl<S, P> Retriable<S, P>
where
    S: Strategy,
{
    /// Creates a new [Retriable] instance that only retries failures
    /// accepted by the specified [Policy].
    #[must_use]
    pub fn with_policy(strategy: S, policy: P) -> Self {
        Self { strategy, policy }
    }
}

impl<E, S, P> Retry<E> for Retriable<S, P>
where
    E: Send,
    S: Strategy,
    P: Policy<E>,
{
    fn retry<'a, T, F, Fut>(&'a self, operation: F) -> BoxFuture<'a, Result<T, E>>
    where
        T: Send + 'a,
        E: 'a,
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        Box::pin(run(
            operation,
            |retry| self.strategy.next_delay(retry),
            |err| self.policy.can_retry(err),
        ))
    }
}

/// Runs `operation` until it succeeds, until `can_retry` rejects its failure,
/// or until `next_delay` returns no delay for the upcoming retry.
///
/// The failure of the last attempt is returned unchanged.
pub(crate) async fn run<T, E, F, Fut, D, C>(
    mut operation: F,
    next_delay: D,
    can_retry: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    D: Fn(u32) -> Option<Duration>,
    C: Fn(&E) -> bool,
{
    let mut retry = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !can_retry(&err) {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempts = retry + 1, "failure is not retryable, giving up");

            return Err(err);
        }

        retry += 1;

        let Some(delay) = next_delay(retry) else {
            #[cfg(feature = "tracing")]
            tracing::debug!(attempts = retry, "retries exhausted, giving up");

            return Err(err);
        };

        #[cfg(feature = "tracing")]
        tracing::warn!(retry, ?delay, "operation failed, retrying");

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Failure {
        Transient,
        Permanent,
    }

    /// Fails with the provided failure for the first `failures` attempts.
    struct Flaky {
        attempts: AtomicU32,
        failures: u32,
        failure: fn() -> Failure,
    }

    impl Flaky {
        fn new(failures: u32, failure: fn() -> Failure) -> Self {
            Self {
                attempts: AtomicU32::new(0),
                failures,
                failure,
            }
        }

        async fn attempt(&self) -> Result<&'static str, Failure> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

            if attempt <= self.failures {
                return Err((self.failure)());
            }

            Ok("done")
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn it_retries_until_the_operation_succeeds() {
        let flaky = Flaky::new(2, || Failure::Transient);
        let retriable = Retriable::new(Count::new(3));

        let result = retriable.retry(|| flaky.attempt()).await;

        assert_eq!(Ok("done"), result);
        assert_eq!(3, flaky.attempts());
    }

    #[tokio::test]
    async fn it_surfaces_the_last_failure_once_retries_are_exhausted() {
        let flaky = Flaky::new(10, || Failure::Transient);
        let retriable = Retriable::new(Count::new(3));

        let result = retriable.retry(|| flaky.attempt()).await;

        assert_eq!(Err(Failure::Transient), result);
        assert_eq!(4, flaky.attempts());
    }

    #[tokio::test]
    async fn it_does_not_retry_failures_rejected_by_the_policy() {
        let flaky = Flaky::new(2, || Failure::Permanent);
        let retriable =
            Retriable::with_policy(Count::new(3), |err: &Failure| *err == Failure::Transient);

        let result = retriable.retry(|| flaky.attempt()).await;

        assert_eq!(Err(Failure::Permanent), result);
        assert_eq!(1, flaky.attempts());
    }

    #[tokio::test(start_paused = true)]
    async fn it_waits_between_attempts() {
        let flaky = Flaky::new(2, || Failure::Transient);
        let retriable = Retriable::new(Linear::new(2, Duration::from_secs(30)));

        let started_at = tokio::time::Instant::now();
        let result = retriable.retry(|| flaky.attempt()).await;

        assert_eq!(Ok("done"), result);
        assert_eq!(3, flaky.attempts());
        assert!(started_at.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn shared_capabilities_retry_like_the_inner_one() {
        let flaky = Flaky::new(1, || Failure::Transient);
        let retriable = Arc::new(Retriable::new(Count::new(1)));

        let result = retriable.retry(|| flaky.attempt()).await;

        assert_eq!(Ok("done"), result);
        assert_eq!(2, flaky.attempts());
    }
}
