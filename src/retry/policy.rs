//! Policies classifying which failures are worth retrying.

/// Decides whether a failure of type `E` can be retried.
///
/// Any `Fn(&E) -> bool` closure is a valid [Policy].
pub trait Policy<E>: Send + Sync {
    /// Returns `true` if the operation that failed with `error`
    /// can be attempted again.
    fn can_retry(&self, error: &E) -> bool;
}

/// [Policy] that considers every failure retryable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnyError;

impl<E> Policy<E> for AnyError {
    fn can_retry(&self, _error: &E) -> bool {
        true
    }
}

impl<E, F> Policy<E> for F
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn can_retry(&self, error: &E) -> bool {
        self(error)
    }
}
