//! Module containing the [Resolver] abstraction, used by the
//! [Dispatcher][crate::Dispatcher] to look up the data source instance
//! a request should be handled against.
//!
//! Resolution is keyed by the data source **type**, identified at runtime
//! through a [`DataSourceId`]. How instances are created, shared or disposed
//! is entirely up to the [Resolver] implementation: the dispatcher only
//! borrows the resolved [Instance] for the duration of a single dispatch.
//!
//! Any function with the signature
//! `Fn(DataSourceId) -> Result<Instance, ResolutionError>` is a valid
//! [Resolver]. For simple wiring, [Registry] maps each registered type
//! to a shared instance.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A data source instance, as returned by a [Resolver].
///
/// The [Dispatcher][crate::Dispatcher] downcasts it to the concrete type
/// requested by the Query or Command being dispatched.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Runtime identifier of a data source type, used as the lookup key
/// for a [Resolver].
///
/// Two identifiers are equal when they identify the same type;
/// the type name is only kept for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct DataSourceId {
    type_id: TypeId,
    type_name: &'static str,
}

impl DataSourceId {
    /// Returns the identifier of the data source type `D`.
    #[must_use]
    pub fn of<D>() -> Self
    where
        D: Any,
    {
        Self {
            type_id: TypeId::of::<D>(),
            type_name: std::any::type_name::<D>(),
        }
    }

    /// Returns the [`TypeId`] of the identified data source type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the identified data source type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if this identifier refers to the data source type `D`.
    #[must_use]
    pub fn is<D>(&self) -> bool
    where
        D: Any,
    {
        self.type_id == TypeId::of::<D>()
    }
}

impl PartialEq for DataSourceId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for DataSourceId {}

impl Hash for DataSourceId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for DataSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// All possible error types returned by [`Resolver::resolve`], or by the
/// [Dispatcher][crate::Dispatcher] while resolving a data source.
///
/// Resolution errors point at a wiring issue rather than a transient fault,
/// so they are never retried.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// Error returned when the [Resolver] has no instance for the requested type.
    #[error("no data source available for type: {0}")]
    NotFound(DataSourceId),

    /// Error returned when the [Resolver] produced an instance of a type
    /// different from the one requested.
    #[error("resolved instance is not of the requested data source type: {0}")]
    TypeMismatch(DataSourceId),

    /// Error returned when the [Resolver] implementation has encountered an error.
    #[error("failed to resolve data source, an error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Maps a data source type to a concrete data source [Instance].
///
/// Implementations must be able to resolve every data source type the
/// application dispatches requests against, and must not perform any retry
/// on their own.
pub trait Resolver: Send + Sync {
    /// Resolves the data source instance for the type identified by `id`.
    ///
    /// # Errors
    ///
    /// A [`ResolutionError`] is returned if no instance can be produced
    /// for the requested type.
    fn resolve(&self, id: DataSourceId) -> Result<Instance, ResolutionError>;
}

impl<F> Resolver for F
where
    F: Fn(DataSourceId) -> Result<Instance, ResolutionError> + Send + Sync,
{
    fn resolve(&self, id: DataSourceId) -> Result<Instance, ResolutionError> {
        self(id)
    }
}

/// [Resolver] implementation backed by a [`HashMap`] of shared instances,
/// one per data source type.
///
/// Every resolution of the same type returns the same shared instance.
#[derive(Default, Clone)]
pub struct Registry {
    instances: HashMap<DataSourceId, Instance>,
}

impl Registry {
    /// Registers a data source instance for its type, replacing
    /// any instance previously registered for the same type.
    #[must_use]
    pub fn register<D>(self, source: D) -> Self
    where
        D: Send + Sync + 'static,
    {
        self.register_shared(Arc::new(source))
    }

    /// Registers an already shared data source instance for its type.
    ///
    /// Useful when the caller needs to keep its own handle to the instance.
    #[must_use]
    pub fn register_shared<D>(mut self, source: Arc<D>) -> Self
    where
        D: Send + Sync + 'static,
    {
        self.instances.insert(DataSourceId::of::<D>(), source);
        self
    }

    /// Returns `true` if an instance has been registered for the type `D`.
    #[must_use]
    pub fn contains<D>(&self) -> bool
    where
        D: Any,
    {
        self.instances.contains_key(&DataSourceId::of::<D>())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.instances.keys()).finish()
    }
}

impl Resolver for Registry {
    fn resolve(&self, id: DataSourceId) -> Result<Instance, ResolutionError> {
        self.instances
            .get(&id)
            .cloned()
            .ok_or(ResolutionError::NotFound(id))
    }
}
