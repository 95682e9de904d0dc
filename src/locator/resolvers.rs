//! Scoped resolvers and the fallback chain.
//!
//! Each resolver checks its own store first, then its scope's lazy
//! providers, then delegates outward. Factories and lifecycle hooks always
//! run with no locator locks held, so a factory may itself resolve or
//! register services.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::descriptors::{AnyArc, Descriptor, ServiceValue, Store, Stored};
use crate::error::{LocatorError, LocatorResult};
use crate::internal::guarded;
use crate::key::Key;
use crate::locator::ServiceLocator;
use crate::scope::Scope;
use crate::traits::ResolverCore;

fn fire_resolved(sv: &ServiceValue) {
    guarded("resolve callback", || sv.hooks.on_resolved());
}

fn store_hit(store: &Option<Store>, key: &Key) -> Option<ServiceValue> {
    let stored = store.as_ref()?.lock().unwrap().get(key).cloned()?;
    Some(stored.into_value())
}

/// Runs the lazy-provider path for a scene or entity store.
///
/// Returns `Ok(None)` when no provider is registered for `key` at this
/// breadth, which tells the caller to delegate outward. A cache hit under
/// the provider's original key is returned without firing `on_resolved`;
/// hooks fire only on the resolve that actually materialized the instance.
fn materialize_scoped(
    locator: &ServiceLocator,
    scope: Scope,
    key: &Key,
    ensure_store: impl FnOnce() -> LocatorResult<Store>,
) -> LocatorResult<Option<AnyArc>> {
    let entry = {
        let table = locator.inner.providers[scope.index()].lock().unwrap();
        table.get(key).cloned()
    };
    let Some(entry) = entry else { return Ok(None) };

    let store = ensure_store()?;
    let original = *entry.provider.original_key();
    let cached = store
        .lock()
        .unwrap()
        .get(&original)
        .cloned()
        .map(Stored::into_value);
    if let Some(sv) = cached {
        let view = entry
            .view(&sv)
            .ok_or(LocatorError::TypeMismatch(key.name()))?;
        return Ok(Some(view.any));
    }

    let made = entry.provider.materialize();
    let (sv, fresh) = {
        let mut guard = store.lock().unwrap();
        match guard.entry(original) {
            // lost a race against a concurrent or re-entrant resolve; the
            // first instance in wins and ours is dropped
            Entry::Occupied(existing) => (existing.get().clone().into_value(), false),
            Entry::Vacant(slot) => {
                slot.insert(Stored::Instance(made.clone()));
                (made, true)
            }
        }
    };
    if fresh {
        log::debug!("materialized {} in {} scope", original.name(), scope);
        guarded("provider-created callback", || sv.hooks.on_provider_created());
    }
    let view = entry
        .view(&sv)
        .ok_or(LocatorError::TypeMismatch(key.name()))?;
    if fresh {
        fire_resolved(&sv);
    }
    Ok(Some(view.any))
}

/// Resolver over the global scope: registered instances, transients, and
/// global lazy providers. Terminal link of every fallback chain.
pub struct GlobalResolver {
    locator: ServiceLocator,
}

impl GlobalResolver {
    pub(crate) fn new(locator: ServiceLocator) -> Self {
        GlobalResolver { locator }
    }
}

impl ResolverCore for GlobalResolver {
    fn is_in_scope(&self) -> bool {
        true
    }

    fn resolve_any(&self, key: &Key) -> LocatorResult<AnyArc> {
        enum Hit {
            Value(ServiceValue),
            Factory(Arc<dyn Fn() -> ServiceValue + Send + Sync>),
        }
        let hit = {
            let global = self.locator.inner.global.lock().unwrap();
            global.get(key).map(|descriptor| match descriptor {
                Descriptor::Instance(sv) | Descriptor::Alias(sv) => Hit::Value(sv.clone()),
                Descriptor::Transient(factory) => Hit::Factory(factory.clone()),
            })
        };
        if let Some(hit) = hit {
            let sv = match hit {
                Hit::Value(sv) => sv,
                Hit::Factory(factory) => factory(),
            };
            fire_resolved(&sv);
            return Ok(sv.any);
        }

        let entry = {
            let table = self.locator.inner.providers[Scope::Global.index()].lock().unwrap();
            table.get(key).cloned()
        };
        let Some(entry) = entry else {
            return Err(LocatorError::NotRegistered(key.name()));
        };
        let original = *entry.provider.original_key();
        let cached = {
            let global = self.locator.inner.global.lock().unwrap();
            match global.get(&original) {
                Some(Descriptor::Instance(sv)) => Some(sv.clone()),
                _ => None,
            }
        };
        if let Some(sv) = cached {
            let view = entry
                .view(&sv)
                .ok_or(LocatorError::TypeMismatch(key.name()))?;
            return Ok(view.any);
        }

        let made = entry.provider.materialize();
        let (sv, fresh) = {
            let mut global = self.locator.inner.global.lock().unwrap();
            match global.entry(original) {
                Entry::Occupied(existing) => match existing.get() {
                    Descriptor::Instance(sv) | Descriptor::Alias(sv) => (sv.clone(), false),
                    Descriptor::Transient(_) => {
                        return Err(LocatorError::Duplicate {
                            type_name: original.name(),
                            scope: "global",
                        })
                    }
                },
                Entry::Vacant(slot) => {
                    slot.insert(Descriptor::Instance(made.clone()));
                    (made, true)
                }
            }
        };
        if fresh {
            log::debug!("materialized {} in global scope", original.name());
            guarded("provider-created callback", || sv.hooks.on_provider_created());
        }
        let view = entry
            .view(&sv)
            .ok_or(LocatorError::TypeMismatch(key.name()))?;
        if fresh {
            fire_resolved(&sv);
        }
        Ok(view.any)
    }
}

/// Resolver rooted at a scene, falling back to the global scope.
///
/// The scene's store is looked up lazily and cached once found, so a
/// resolver built before the scene's first registration still sees it.
pub struct SceneResolver {
    locator: ServiceLocator,
    scene: crate::SceneId,
    store: OnceCell<Store>,
}

impl SceneResolver {
    pub(crate) fn new(locator: ServiceLocator, scene: crate::SceneId) -> Self {
        let store = OnceCell::new();
        if let Some(existing) = locator.scene_store(scene) {
            let _ = store.set(existing);
        }
        SceneResolver {
            locator,
            scene,
            store,
        }
    }

    /// The scene this resolver is rooted at.
    pub fn scene(&self) -> crate::SceneId {
        self.scene
    }

    fn store(&self) -> Option<Store> {
        if let Some(store) = self.store.get() {
            return Some(store.clone());
        }
        let found = self.locator.scene_store(self.scene)?;
        Some(self.store.get_or_init(|| found).clone())
    }

    fn store_or_create(&self) -> LocatorResult<Store> {
        if let Some(store) = self.store() {
            return Ok(store);
        }
        let created = self.locator.ensure_scene_store(self.scene)?;
        Ok(self.store.get_or_init(|| created).clone())
    }
}

impl ResolverCore for SceneResolver {
    fn is_in_scope(&self) -> bool {
        self.locator.inner.host.scene_is_loaded(self.scene)
    }

    fn resolve_any(&self, key: &Key) -> LocatorResult<AnyArc> {
        if !self.is_in_scope() {
            return Err(LocatorError::ExpiredScope("scene"));
        }
        if let Some(sv) = store_hit(&self.store(), key) {
            fire_resolved(&sv);
            return Ok(sv.any);
        }
        if let Some(any) =
            materialize_scoped(&self.locator, Scope::Scene, key, || self.store_or_create())?
        {
            return Ok(any);
        }
        self.locator.for_global().resolve_any(key)
    }
}

/// Resolver rooted at an entity.
///
/// Misses walk up through existing ancestor stores (when hierarchy search
/// is on), then this entity's lazy providers, then the entity's scene, then
/// the global scope. Ancestor stores are only consulted, never created or
/// materialized into, on behalf of a descendant.
pub struct EntityResolver {
    locator: ServiceLocator,
    entity: crate::EntityId,
    search_hierarchy: bool,
    store: OnceCell<Store>,
}

impl EntityResolver {
    pub(crate) fn new(
        locator: ServiceLocator,
        entity: crate::EntityId,
        search_hierarchy: bool,
    ) -> Self {
        let store = OnceCell::new();
        if let Some(existing) = locator.entity_store(entity) {
            let _ = store.set(existing);
        }
        EntityResolver {
            locator,
            entity,
            search_hierarchy,
            store,
        }
    }

    /// The entity this resolver is rooted at.
    pub fn entity(&self) -> crate::EntityId {
        self.entity
    }

    fn store(&self) -> Option<Store> {
        if let Some(store) = self.store.get() {
            return Some(store.clone());
        }
        let found = self.locator.entity_store(self.entity)?;
        Some(self.store.get_or_init(|| found).clone())
    }

    fn store_or_create(&self) -> LocatorResult<Store> {
        if let Some(store) = self.store() {
            return Ok(store);
        }
        let created = self.locator.ensure_entity_store(self.entity)?;
        Ok(self.store.get_or_init(|| created).clone())
    }

    fn hierarchy_hit(&self, key: &Key) -> Option<ServiceValue> {
        let host = &self.locator.inner.host;
        let mut current = host.entity_parent(self.entity);
        while let Some(ancestor) = current {
            if let Some(sv) = store_hit(&self.locator.entity_store(ancestor), key) {
                return Some(sv);
            }
            current = host.entity_parent(ancestor);
        }
        None
    }
}

impl ResolverCore for EntityResolver {
    fn is_in_scope(&self) -> bool {
        self.locator.inner.host.entity_is_alive(self.entity)
    }

    fn resolve_any(&self, key: &Key) -> LocatorResult<AnyArc> {
        if !self.is_in_scope() {
            return Err(LocatorError::ExpiredScope("entity"));
        }
        if let Some(sv) = store_hit(&self.store(), key) {
            fire_resolved(&sv);
            return Ok(sv.any);
        }
        if self.search_hierarchy {
            if let Some(sv) = self.hierarchy_hit(key) {
                fire_resolved(&sv);
                return Ok(sv.any);
            }
        }
        if let Some(any) =
            materialize_scoped(&self.locator, Scope::Entity, key, || self.store_or_create())?
        {
            return Ok(any);
        }
        match self.locator.inner.host.entity_scene(self.entity) {
            Some(scene) => self.locator.for_scene(scene).resolve_any(key),
            None => self.locator.for_global().resolve_any(key),
        }
    }
}
