//! Module `query` contains the abstraction used to model read-only requests
//! against a data source.

use async_trait::async_trait;

/// A Query is a read-only request that produces a result
/// by reading from a specific data source.
///
/// The data source the Query is evaluated against is described by the
/// [`DataSource`][Query::DataSource] associated type: the
/// [Dispatcher][crate::Dispatcher] uses it as the key to resolve the
/// concrete instance at dispatch time, so the Query itself never carries
/// a reference to it.
///
/// Queries are borrowed during dispatch, so the same value can be
/// dispatched more than once, and evaluated more than once when retried.
#[async_trait]
pub trait Query: Send + Sync {
    /// The data source type the Query reads from.
    type DataSource: Send + Sync + 'static;
    /// The result type produced by evaluating the Query.
    type Output: Send;
    /// The error type returned when the Query evaluation fails.
    type Error: Send;

    /// Evaluates the Query against the resolved data source instance.
    ///
    /// # Errors
    ///
    /// As the evaluation can fail, an [Error][Query::Error] can be returned instead.
    async fn get(&self, source: &Self::DataSource) -> Result<Self::Output, Self::Error>;
}
