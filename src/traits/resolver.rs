//! Resolution traits.
//!
//! [`ResolverCore`] is the object-safe, type-erased surface each scoped
//! resolver implements; [`Resolver`] layers the generic `get`/`try_get`
//! convenience on top and is blanket-implemented for every core resolver.

use std::any::type_name;
use std::sync::Arc;

use crate::descriptors::AnyArc;
use crate::error::{LocatorError, LocatorResult};
use crate::key::{key_of, Key};

/// Object-safe resolution over type-erased keys.
pub trait ResolverCore {
    /// Whether this resolver's owner is still alive.
    fn is_in_scope(&self) -> bool;

    /// Resolves `key` through this scope's fallback chain.
    ///
    /// Fires the instance's `on_resolved` hook when a service is handed
    /// out, except when an alias view of an already-materialized provider
    /// instance is served from cache.
    fn resolve_any(&self, key: &Key) -> LocatorResult<AnyArc>;

    /// Like [`resolve_any`](Self::resolve_any) but maps every failure to
    /// `None`.
    fn try_resolve_any(&self, key: &Key) -> Option<AnyArc> {
        self.resolve_any(key).ok()
    }
}

/// Typed resolution, blanket-implemented for all [`ResolverCore`] types.
///
/// Concrete services come back through [`get`](Self::get); services
/// registered or aliased under a trait come back through
/// [`get_trait`](Self::get_trait). Requesting a trait key through `get`
/// (or vice versa) fails with [`LocatorError::TypeMismatch`].
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service.
    fn get<T: Send + Sync + 'static>(&self) -> LocatorResult<Arc<T>> {
        self.resolve_any(&key_of::<T>())?
            .downcast::<T>()
            .map_err(|_| LocatorError::TypeMismatch(type_name::<T>()))
    }

    /// Resolves a concrete service, mapping every failure to `None`.
    fn try_get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.try_resolve_any(&key_of::<T>())?.downcast::<T>().ok()
    }

    /// Resolves a service registered under a trait-object key.
    fn get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> LocatorResult<Arc<T>> {
        self.resolve_any(&key_of::<T>())?
            .downcast::<Arc<T>>()
            .map(|outer| (*outer).clone())
            .map_err(|_| LocatorError::TypeMismatch(type_name::<T>()))
    }

    /// Resolves a trait-keyed service, mapping every failure to `None`.
    fn try_get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.try_resolve_any(&key_of::<T>())?
            .downcast::<Arc<T>>()
            .map(|outer| (*outer).clone())
            .ok()
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
