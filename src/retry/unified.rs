use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::retry::{self, AnyError, Policy, Retry};

/// A single [Retry] policy object, describing which failures to handle,
/// how many times to retry them and how long to wait in between.
///
/// ```
/// # use std::time::Duration;
/// # use command_query::retry::RetryPolicy;
/// #[derive(Debug, PartialEq)]
/// enum StoreError {
///     Busy,
///     Corrupted,
/// }
///
/// let policy = RetryPolicy::handle(|err: &StoreError| *err == StoreError::Busy)
///     .retries(3)
///     .wait(Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy<P = AnyError> {
    handle: P,
    max_retries: u32,
    wait: Duration,
}

impl RetryPolicy {
    /// Creates a policy handling any failure.
    ///
    /// No retry is attempted until [`retries`][RetryPolicy::retries] is called.
    #[must_use]
    pub fn any() -> Self {
        Self::handle(AnyError)
    }
}

impl<P> RetryPolicy<P> {
    /// Creates a policy handling only the failures accepted by `handle`.
    ///
    /// No retry is attempted until [`retries`][RetryPolicy::retries] is called.
    #[must_use]
    pub fn handle(handle: P) -> Self {
        Self {
            handle,
            max_retries: 0,
            wait: Duration::ZERO,
        }
    }

    /// Sets the maximum number of retries after the first failed attempt.
    #[must_use]
    pub fn retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the time to wait before each retry.
    #[must_use]
    pub fn wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }
}

impl<E, P> Retry<E> for RetryPolicy<P>
where
    E: Send,
    P: Policy<E>,
{
    fn retry<'a, T, F, Fut>(&'a self, operation: F) -> BoxFuture<'a, Result<T, E>>
    where
        T: Send + 'a,
        E: 'a,
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        Box::pin(retry::run(
            operation,
            |retry| (retry <= self.max_retries).then_some(self.wait),
            |err| self.handle.can_retry(err),
        ))
    }
}
