//! Type-erased storage for registered services.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::key::Key;
use crate::traits::Lifecycle;

/// Shared, type-erased service handle.
pub type AnyArc = Arc<dyn std::any::Any + Send + Sync>;

/// A stored service: the erased instance plus its lifecycle hooks.
///
/// For a direct registration `any` holds `Arc<T>`. For a trait alias it
/// holds `Arc<Arc<dyn Trait>>` so the fat pointer survives erasure. Either
/// way `hooks` is the original concrete instance, so alias views fire the
/// same hooks as the registration they shadow.
#[derive(Clone)]
pub(crate) struct ServiceValue {
    pub(crate) any: AnyArc,
    pub(crate) hooks: Arc<dyn Lifecycle>,
}

impl ServiceValue {
    pub(crate) fn new<T: Lifecycle>(instance: Arc<T>) -> Self {
        let any: AnyArc = instance.clone();
        ServiceValue {
            any,
            hooks: instance,
        }
    }
}

/// Global-table entry.
#[derive(Clone)]
pub(crate) enum Descriptor {
    /// A registered singleton.
    Instance(ServiceValue),
    /// A trait view of an instance registered under another key.
    Alias(ServiceValue),
    /// A factory invoked on every resolve; nothing is cached.
    Transient(Arc<dyn Fn() -> ServiceValue + Send + Sync>),
}

/// Scene- and entity-store entry. Transients are global-only.
#[derive(Clone)]
pub(crate) enum Stored {
    Instance(ServiceValue),
    Alias(ServiceValue),
}

impl Stored {
    pub(crate) fn into_value(self) -> ServiceValue {
        match self {
            Stored::Instance(sv) | Stored::Alias(sv) => sv,
        }
    }
}

/// A per-owner service table.
///
/// Shared so resolvers hold a live view: entries added or removed after a
/// resolver cached the store are still observed. A store exists only while
/// its owner has at least one registration; teardown removes it from the
/// owner map before draining it.
pub(crate) type Store = Arc<Mutex<HashMap<Key, Stored>>>;
