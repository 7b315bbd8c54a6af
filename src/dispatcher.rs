//! Module containing the [Dispatcher], routing [Query] and [Command]
//! requests to the data source instance they are handled against.
//!
//! ## Dispatching a request
//!
//! For every [`get`][Dispatcher::get] and [`execute`][Dispatcher::execute] call,
//! the [Dispatcher]:
//!
//! 1. resolves the data source instance, named by the request's
//!    `DataSource` associated type, through its [Resolver],
//! 2. builds a deferred operation invoking the request handler with
//!    that instance,
//! 3. runs the operation through its [Execution] strategy: either directly,
//!    or through a [Retry] capability.
//!
//! Resolution happens exactly once per call, **before** any retry:
//! resolution failures are surfaced immediately, and every retried attempt
//! is made against the same data source instance.
//!
//! The [Execution] strategy is chosen once, at construction, through the
//! [Dispatcher] type itself:
//!
//! * [`Dispatcher::new`] creates a [`Dispatcher<Direct>`], invoking handlers once,
//! * [`Dispatcher::with_retry`] creates a [`Dispatcher<Retrying<R>>`], submitting
//!   handler invocations to the retry capability `R`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::resolver::{DataSourceId, ResolutionError, Resolver};
use crate::retry::Retry;
use crate::{Command, Query};

/// Error type returned by the [Dispatcher].
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    /// Error returned when the data source of the request could not be resolved.
    ///
    /// The request handler has not been invoked.
    #[error("failed to resolve data source: {0}")]
    Resolution(#[source] ResolutionError),

    /// Error returned by the request handler, as surfaced after
    /// the [Execution] strategy has given up.
    #[error("request handler failed: {0}")]
    Handler(#[source] E),
}

impl<E> Error<E> {
    /// Returns the request handler error, if any.
    #[must_use]
    pub fn into_handler_error(self) -> Option<E> {
        match self {
            Error::Handler(err) => Some(err),
            Error::Resolution(_) => None,
        }
    }
}

/// Error returned when a [Dispatcher] is built with an invalid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// No [Resolver] has been provided to the [Builder].
    #[error("a data source resolver is required to build a dispatcher")]
    MissingResolver,
}

/// Strategy used by the [Dispatcher] to run request handlers.
///
/// The operation passed to [`run`][Execution::run] invokes the request handler
/// once per call, against the already-resolved data source instance.
pub trait Execution<E>: Send + Sync {
    /// Runs the deferred `operation` and returns its outcome.
    fn run<'a, T, F, Fut>(&'a self, operation: F) -> BoxFuture<'a, Result<T, E>>
    where
        T: Send + 'a,
        E: 'a,
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a;
}

/// [Execution] strategy invoking request handlers exactly once,
/// surfacing their failure as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct Direct;

impl<E> Execution<E> for Direct {
    fn run<'a, T, F, Fut>(&'a self, mut operation: F) -> BoxFuture<'a, Result<T, E>>
    where
        T: Send + 'a,
        E: 'a,
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        Box::pin(operation())
    }
}

/// [Execution] strategy submitting request handler invocations
/// to a [Retry] capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct Retrying<R>(R);

impl<R> Retrying<R> {
    /// Returns the wrapped [Retry] capability.
    #[must_use]
    pub fn capability(&self) -> &R {
        &self.0
    }
}

impl<E, R> Execution<E> for Retrying<R>
where
    R: Retry<E>,
{
    fn run<'a, T, F, Fut>(&'a self, operation: F) -> BoxFuture<'a, Result<T, E>>
    where
        T: Send + 'a,
        E: 'a,
        F: FnMut() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T, E>> + Send + 'a,
    {
        self.0.retry(operation)
    }
}

/// Routes [Query] and [Command] requests to the data source they are
/// handled against, as resolved by a [Resolver].
///
/// A Dispatcher is meant to be built once and shared for the lifetime of
/// the application: it keeps no per-call state, and can be used concurrently
/// by any number of callers. Its [Resolver] and [Execution] strategy are set
/// at construction and never change.
pub struct Dispatcher<X = Direct> {
    resolver: Arc<dyn Resolver>,
    execution: X,
}

impl<X> Clone for Dispatcher<X>
where
    X: Clone,
{
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            execution: self.execution.clone(),
        }
    }
}

impl<X> fmt::Debug for Dispatcher<X>
where
    X: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("execution", &self.execution)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a new [Dispatcher] invoking request handlers directly,
    /// with no retry.
    #[must_use]
    pub fn new<R>(resolver: R) -> Self
    where
        R: Resolver + 'static,
    {
        Self {
            resolver: Arc::new(resolver),
            execution: Direct,
        }
    }

    /// Returns a [Builder] to configure a new [Dispatcher].
    #[must_use]
    pub fn builder() -> Builder {
        Builder::default()
    }
}

impl<R> Dispatcher<Retrying<R>> {
    /// Creates a new [Dispatcher] submitting every request handler
    /// invocation to the specified [Retry] capability.
    #[must_use]
    pub fn with_retry<Res>(resolver: Res, retry: R) -> Self
    where
        Res: Resolver + 'static,
    {
        Self {
            resolver: Arc::new(resolver),
            execution: Retrying(retry),
        }
    }
}

impl<X> Dispatcher<X> {
    /// Returns the [Execution] strategy used by this instance.
    #[must_use]
    pub fn execution(&self) -> &X {
        &self.execution
    }

    fn source<D>(&self) -> Result<Arc<D>, ResolutionError>
    where
        D: Send + Sync + 'static,
    {
        let id = DataSourceId::of::<D>();

        self.resolver
            .resolve(id)?
            .downcast::<D>()
            .map_err(|_| ResolutionError::TypeMismatch(id))
    }

    /// Evaluates the [Query] against its resolved data source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolution`] if the data source could not be resolved,
    /// or [`Error::Handler`] with the failure surfaced by the [Execution] strategy.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "Dispatcher.get",
            skip_all,
            fields(
                query = std::any::type_name::<Q>(),
                data_source = std::any::type_name::<Q::DataSource>()
            )
        )
    )]
    pub async fn get<Q>(&self, query: &Q) -> Result<Q::Output, Error<Q::Error>>
    where
        Q: Query,
        X: Execution<Q::Error>,
    {
        let source = self
            .source::<Q::DataSource>()
            .map_err(Error::Resolution)?;

        let source = source.as_ref();

        self.execution
            .run(move || query.get(source))
            .await
            .map_err(Error::Handler)
    }

    /// Executes the [Command] against its resolved data source.
    ///
    /// Commands with `()` as [Output][Command::Output] only signal completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolution`] if the data source could not be resolved,
    /// or [`Error::Handler`] with the failure surfaced by the [Execution] strategy.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "Dispatcher.execute",
            skip_all,
            fields(
                command = std::any::type_name::<C>(),
                data_source = std::any::type_name::<C::DataSource>()
            )
        )
    )]
    pub async fn execute<C>(&self, command: &C) -> Result<C::Output, Error<C::Error>>
    where
        C: Command,
        X: Execution<C::Error>,
    {
        let source = self
            .source::<C::DataSource>()
            .map_err(Error::Resolution)?;

        let source = source.as_ref();

        self.execution
            .run(move || command.execute(source))
            .await
            .map_err(Error::Handler)
    }
}

/// Builder for a [Dispatcher], failing fast at [`build`][Builder::build]
/// time when no [Resolver] has been provided.
pub struct Builder<X = Direct> {
    resolver: Option<Arc<dyn Resolver>>,
    execution: X,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            resolver: None,
            execution: Direct,
        }
    }
}

impl Builder {
    /// Submits every request handler invocation of the [Dispatcher]
    /// to the specified [Retry] capability.
    #[must_use]
    pub fn retry<R>(self, retry: R) -> Builder<Retrying<R>> {
        Builder {
            resolver: self.resolver,
            execution: Retrying(retry),
        }
    }
}

impl<X> Builder<X> {
    /// Sets the [Resolver] used by the [Dispatcher].
    #[must_use]
    pub fn resolver<R>(mut self, resolver: R) -> Self
    where
        R: Resolver + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Builds the configured [Dispatcher].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingResolver`] if no [Resolver] has been set.
    pub fn build(self) -> Result<Dispatcher<X>, ConfigurationError> {
        let resolver = self.resolver.ok_or(ConfigurationError::MissingResolver)?;

        Ok(Dispatcher {
            resolver,
            execution: self.execution,
        })
    }
}
