//! Lazy providers: deferred factories materialized on first resolve.

use std::sync::Arc;

use crate::descriptors::ServiceValue;
use crate::key::{key_of, Key};
use crate::scope::Scope;
use crate::traits::Lifecycle;

/// A deferred registration: the factory runs at most once per owner, on the
/// first resolve that reaches it.
pub struct LazyProvider {
    factory: Box<dyn Fn() -> ServiceValue + Send + Sync>,
    original: Key,
    scope: Scope,
}

impl LazyProvider {
    pub(crate) fn new<T, F>(scope: Scope, factory: F) -> Self
    where
        T: Lifecycle,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        LazyProvider {
            factory: Box::new(move || ServiceValue::new(factory())),
            original: key_of::<T>(),
            scope,
        }
    }

    /// Key of the concrete type the factory produces. Materialized instances
    /// are always cached under this key, never under an alias key.
    pub fn original_key(&self) -> &Key {
        &self.original
    }

    /// The breadth this provider materializes at.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub(crate) fn materialize(&self) -> ServiceValue {
        (self.factory)()
    }
}

/// Maps a materialized original instance to an aliased view of it.
///
/// Returns `None` when the cached value is not the expected concrete type,
/// which surfaces as `TypeMismatch` at the resolve site.
pub(crate) type CastFn = Arc<dyn Fn(&ServiceValue) -> Option<ServiceValue> + Send + Sync>;

/// Provider-table entry: the shared provider plus, for alias keys, the view
/// conversion.
#[derive(Clone)]
pub(crate) struct ProviderEntry {
    pub(crate) provider: Arc<LazyProvider>,
    pub(crate) cast: Option<CastFn>,
}

impl ProviderEntry {
    pub(crate) fn direct(provider: Arc<LazyProvider>) -> Self {
        ProviderEntry {
            provider,
            cast: None,
        }
    }

    pub(crate) fn aliased(provider: Arc<LazyProvider>, cast: CastFn) -> Self {
        ProviderEntry {
            provider,
            cast: Some(cast),
        }
    }

    /// Applies the alias view, if any, to a materialized value.
    pub(crate) fn view(&self, sv: &ServiceValue) -> Option<ServiceValue> {
        match &self.cast {
            None => Some(sv.clone()),
            Some(cast) => cast(sv),
        }
    }
}
