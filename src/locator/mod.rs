//! The service locator: registration and scoped-resolver construction.

mod aliasers;
mod managed;
mod resolvers;

pub use aliasers::{InstanceAliaser, ProviderAliaser};
pub use managed::ManagedResolver;
pub use resolvers::{EntityResolver, GlobalResolver, SceneResolver};

use std::any::type_name;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::descriptors::{Descriptor, ServiceValue, Store, Stored};
use crate::disposers::{EntityDisposer, SceneDisposer};
use crate::error::{LocatorError, LocatorResult};
use crate::handle::RegistrationHandle;
use crate::host::{EntityId, Host, SceneId};
use crate::internal::guarded;
use crate::key::{key_of, Key};
use crate::provider::{CastFn, LazyProvider, ProviderEntry};
use crate::scope::Scope;
use crate::traits::Lifecycle;

use aliasers::AliasScope;
use managed::ManagedEntry;

pub(crate) struct LocatorInner {
    pub(crate) host: Arc<dyn Host>,
    pub(crate) global: Mutex<HashMap<Key, Descriptor>>,
    pub(crate) scenes: Mutex<HashMap<SceneId, Store>>,
    pub(crate) entities: Mutex<HashMap<EntityId, Store>>,
    pub(crate) managed: Mutex<HashMap<Key, ManagedEntry>>,
    pub(crate) providers: [Mutex<HashMap<Key, ProviderEntry>>; Scope::COUNT],
    pub(crate) scene_disposer: SceneDisposer,
    pub(crate) entity_disposer: EntityDisposer,
}

/// Hierarchical service locator.
///
/// Services are keyed by type and live in one of four scopes: global,
/// per-scene, per-entity, or managed (torn down by an explicit
/// [`RegistrationHandle`]). Resolution happens through scoped resolvers
/// ([`for_scene`](Self::for_scene) and friends) that fall back outward:
/// entity to scene to global.
///
/// Cloning is cheap and shares the underlying tables.
///
/// # Examples
///
/// ```rust
/// use scoped_locator::{Lifecycle, Resolver, SceneId, ServiceLocator};
/// use std::sync::Arc;
/// # use scoped_locator::{EntityId, Host};
/// # struct StaticHost;
/// # impl Host for StaticHost {
/// #     fn scene_is_loaded(&self, _: SceneId) -> bool { true }
/// #     fn entity_is_alive(&self, _: EntityId) -> bool { true }
/// #     fn entity_parent(&self, _: EntityId) -> Option<EntityId> { None }
/// #     fn entity_scene(&self, _: EntityId) -> Option<SceneId> { None }
/// # }
///
/// struct Settings {
///     master_volume: f32,
/// }
/// impl Lifecycle for Settings {}
///
/// let locator = ServiceLocator::new(Arc::new(StaticHost));
/// locator.register_global_instance(Arc::new(Settings { master_volume: 0.8 }))?;
///
/// // A scene resolver falls back to the global scope on a miss.
/// let settings = locator.for_scene(SceneId(1)).get::<Settings>()?;
/// assert_eq!(settings.master_volume, 0.8);
/// # Ok::<(), scoped_locator::LocatorError>(())
/// ```
#[derive(Clone)]
pub struct ServiceLocator {
    pub(crate) inner: Arc<LocatorInner>,
}

impl ServiceLocator {
    /// Creates an empty locator backed by `host`.
    pub fn new(host: Arc<dyn Host>) -> Self {
        ServiceLocator {
            inner: Arc::new(LocatorInner {
                host,
                global: Mutex::new(HashMap::new()),
                scenes: Mutex::new(HashMap::new()),
                entities: Mutex::new(HashMap::new()),
                managed: Mutex::new(HashMap::new()),
                providers: std::array::from_fn(|_| Mutex::new(HashMap::new())),
                scene_disposer: SceneDisposer::new(),
                entity_disposer: EntityDisposer::new(),
            }),
        }
    }

    // ---- registration ----

    /// Registers a global singleton under its concrete type.
    ///
    /// The returned aliaser can additionally expose the instance under
    /// trait-object keys.
    pub fn register_global_instance<T: Lifecycle>(
        &self,
        instance: Arc<T>,
    ) -> LocatorResult<InstanceAliaser<T>> {
        let key = key_of::<T>();
        let sv = ServiceValue::new(instance.clone());
        {
            let mut global = self.inner.global.lock().unwrap();
            if global.contains_key(&key) {
                return Err(LocatorError::Duplicate {
                    type_name: key.name(),
                    scope: "global",
                });
            }
            global.insert(key, Descriptor::Instance(sv));
        }
        log::debug!("registered {} in global scope", key.name());
        Ok(InstanceAliaser::new(self.clone(), instance, AliasScope::Global))
    }

    /// Registers a global transient: `factory` runs on every resolve and
    /// nothing is cached.
    pub fn register_transient<T, F>(&self, factory: F) -> LocatorResult<()>
    where
        T: Lifecycle,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let key = key_of::<T>();
        let factory = Arc::new(move || ServiceValue::new(factory()));
        let mut global = self.inner.global.lock().unwrap();
        if global.contains_key(&key) {
            return Err(LocatorError::Duplicate {
                type_name: key.name(),
                scope: "global",
            });
        }
        global.insert(key, Descriptor::Transient(factory));
        log::debug!("registered transient {} in global scope", key.name());
        Ok(())
    }

    /// Registers a singleton owned by `scene`, torn down on scene unload.
    pub fn register_scene_instance<T: Lifecycle>(
        &self,
        scene: SceneId,
        instance: Arc<T>,
    ) -> LocatorResult<InstanceAliaser<T>> {
        let store = self.ensure_scene_store(scene)?;
        let key = key_of::<T>();
        let sv = ServiceValue::new(instance.clone());
        {
            let mut guard = store.lock().unwrap();
            if guard.contains_key(&key) {
                return Err(LocatorError::Duplicate {
                    type_name: key.name(),
                    scope: "scene",
                });
            }
            guard.insert(key, Stored::Instance(sv));
        }
        log::debug!("registered {} in scene {:?}", key.name(), scene);
        Ok(InstanceAliaser::new(
            self.clone(),
            instance,
            AliasScope::Scene(scene),
        ))
    }

    /// Registers a singleton owned by `entity`, torn down when the entity
    /// is destroyed.
    pub fn register_entity_instance<T: Lifecycle>(
        &self,
        entity: EntityId,
        instance: Arc<T>,
    ) -> LocatorResult<InstanceAliaser<T>> {
        let store = self.ensure_entity_store(entity)?;
        let key = key_of::<T>();
        let sv = ServiceValue::new(instance.clone());
        {
            let mut guard = store.lock().unwrap();
            if guard.contains_key(&key) {
                return Err(LocatorError::Duplicate {
                    type_name: key.name(),
                    scope: "entity",
                });
            }
            guard.insert(key, Stored::Instance(sv));
        }
        log::debug!("registered {} on entity {:?}", key.name(), entity);
        Ok(InstanceAliaser::new(
            self.clone(),
            instance,
            AliasScope::Entity(entity),
        ))
    }

    /// Registers a lazy provider at the given breadth. The factory runs on
    /// the first resolve that reaches it, once per owner, and the instance
    /// is cached in that owner's store under the factory's concrete type.
    pub fn register_lazy_provider<T, F>(
        &self,
        scope: Scope,
        factory: F,
    ) -> LocatorResult<ProviderAliaser<T>>
    where
        T: Lifecycle,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let provider = Arc::new(LazyProvider::new(scope, factory));
        let key = *provider.original_key();
        {
            let mut table = self.inner.providers[scope.index()].lock().unwrap();
            if table.contains_key(&key) {
                return Err(LocatorError::Duplicate {
                    type_name: key.name(),
                    scope: scope.as_str(),
                });
            }
            table.insert(key, ProviderEntry::direct(provider.clone()));
        }
        log::debug!("registered {} provider for {}", scope, key.name());
        Ok(ProviderAliaser::new(self.clone(), provider))
    }

    /// Registers a managed singleton. It stays resolvable until the
    /// returned handle is disposed, which removes the entry and runs its
    /// lifecycle teardown.
    pub fn register_managed<T: Lifecycle>(
        &self,
        instance: Arc<T>,
    ) -> LocatorResult<RegistrationHandle> {
        let key = key_of::<T>();
        let sv = ServiceValue::new(instance);
        let weak = Arc::downgrade(&self.inner);
        let handle = RegistrationHandle::new(Box::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            let removed = inner.managed.lock().unwrap().remove(&key);
            if let Some(entry) = removed {
                cleanup_value(&entry.value);
            }
        }));
        let mut managed = self.inner.managed.lock().unwrap();
        if managed.contains_key(&key) {
            return Err(LocatorError::Duplicate {
                type_name: key.name(),
                scope: "managed",
            });
        }
        managed.insert(
            key,
            ManagedEntry {
                value: sv,
                handle: handle.clone(),
            },
        );
        log::debug!("registered {} as managed", key.name());
        Ok(handle)
    }

    // ---- resolvers ----

    /// A resolver over the global scope only.
    pub fn for_global(&self) -> GlobalResolver {
        GlobalResolver::new(self.clone())
    }

    /// A resolver rooted at `scene`, falling back to the global scope.
    ///
    /// Liveness is checked per call, not at construction, so a resolver for
    /// a scene that later unloads starts failing with `ExpiredScope`
    /// instead of going stale silently.
    pub fn for_scene(&self, scene: SceneId) -> SceneResolver {
        SceneResolver::new(self.clone(), scene)
    }

    /// A resolver rooted at `entity`. With `search_hierarchy` set, misses
    /// consult existing ancestor entity stores before this entity's own
    /// providers; either way the final fallback is the entity's scene, then
    /// the global scope.
    pub fn for_entity(&self, entity: EntityId, search_hierarchy: bool) -> EntityResolver {
        EntityResolver::new(self.clone(), entity, search_hierarchy)
    }

    /// A resolver for a managed registration of `T`, bundling a token that
    /// observes the registration's disposal. Fails if `T` is not currently
    /// managed.
    pub fn for_managed<T: Send + Sync + 'static>(&self) -> LocatorResult<ManagedResolver<T>> {
        let handle = self
            .inner
            .managed
            .lock()
            .unwrap()
            .get(&key_of::<T>())
            .map(|entry| entry.handle.clone());
        let handle = handle.ok_or(LocatorError::NotRegistered(type_name::<T>()))?;
        Ok(ManagedResolver::new(self.clone(), handle.token()))
    }

    // ---- scope-end routing ----

    /// Scene unload events and observation.
    pub fn scene_disposer(&self) -> &SceneDisposer {
        &self.inner.scene_disposer
    }

    /// Entity destroy events and observation.
    pub fn entity_disposer(&self) -> &EntityDisposer {
        &self.inner.entity_disposer
    }

    // ---- internals ----

    pub(crate) fn scene_store(&self, scene: SceneId) -> Option<Store> {
        self.inner.scenes.lock().unwrap().get(&scene).cloned()
    }

    pub(crate) fn entity_store(&self, entity: EntityId) -> Option<Store> {
        self.inner.entities.lock().unwrap().get(&entity).cloned()
    }

    /// Gets or creates the store for `scene`, wiring its teardown handle
    /// into the scene disposer on creation.
    pub(crate) fn ensure_scene_store(&self, scene: SceneId) -> LocatorResult<Store> {
        if !self.inner.host.scene_is_loaded(scene) {
            return Err(LocatorError::ExpiredScope("scene"));
        }
        let store: Store = Arc::new(Mutex::new(HashMap::new()));
        let weak = Arc::downgrade(&self.inner);
        let handle = RegistrationHandle::new(Box::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            // remove from the owner map first so re-entrant resolution
            // during teardown cannot revive the store
            let removed = inner.scenes.lock().unwrap().remove(&scene);
            if let Some(store) = removed {
                drain_store(&store);
            }
        }));
        let mut scenes = self.inner.scenes.lock().unwrap();
        if let Some(existing) = scenes.get(&scene) {
            return Ok(existing.clone());
        }
        self.inner.scene_disposer.register_handle(scene, handle)?;
        scenes.insert(scene, store.clone());
        Ok(store)
    }

    /// Gets or creates the store for `entity`. On creation the host is asked
    /// to watch the entity so the destroy event reaches the disposer.
    pub(crate) fn ensure_entity_store(&self, entity: EntityId) -> LocatorResult<Store> {
        if !self.inner.host.entity_is_alive(entity) {
            return Err(LocatorError::ExpiredScope("entity"));
        }
        let store: Store = Arc::new(Mutex::new(HashMap::new()));
        let weak = Arc::downgrade(&self.inner);
        let handle = RegistrationHandle::new(Box::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            let removed = inner.entities.lock().unwrap().remove(&entity);
            if let Some(store) = removed {
                drain_store(&store);
            }
        }));
        {
            let mut entities = self.inner.entities.lock().unwrap();
            if let Some(existing) = entities.get(&entity) {
                return Ok(existing.clone());
            }
            self.inner.entity_disposer.register_handle(entity, handle)?;
            entities.insert(entity, store.clone());
        }
        self.inner.host.watch_entity(entity);
        Ok(store)
    }

    pub(crate) fn register_alias(
        &self,
        key: Key,
        sv: ServiceValue,
        scope: &AliasScope,
    ) -> LocatorResult<()> {
        match scope {
            AliasScope::Global => {
                let mut global = self.inner.global.lock().unwrap();
                if global.contains_key(&key) {
                    return Err(LocatorError::Duplicate {
                        type_name: key.name(),
                        scope: "global",
                    });
                }
                global.insert(key, Descriptor::Alias(sv));
            }
            AliasScope::Scene(scene) => {
                let store = self
                    .scene_store(*scene)
                    .ok_or(LocatorError::ExpiredScope("scene"))?;
                let mut guard = store.lock().unwrap();
                if guard.contains_key(&key) {
                    return Err(LocatorError::Duplicate {
                        type_name: key.name(),
                        scope: "scene",
                    });
                }
                guard.insert(key, Stored::Alias(sv));
            }
            AliasScope::Entity(entity) => {
                let store = self
                    .entity_store(*entity)
                    .ok_or(LocatorError::ExpiredScope("entity"))?;
                let mut guard = store.lock().unwrap();
                if guard.contains_key(&key) {
                    return Err(LocatorError::Duplicate {
                        type_name: key.name(),
                        scope: "entity",
                    });
                }
                guard.insert(key, Stored::Alias(sv));
            }
        }
        log::debug!("aliased {}", key.name());
        Ok(())
    }

    pub(crate) fn register_provider_alias(
        &self,
        key: Key,
        provider: Arc<LazyProvider>,
        cast: CastFn,
    ) -> LocatorResult<()> {
        let scope = provider.scope();
        let mut table = self.inner.providers[scope.index()].lock().unwrap();
        if table.contains_key(&key) {
            return Err(LocatorError::Duplicate {
                type_name: key.name(),
                scope: scope.as_str(),
            });
        }
        table.insert(key, ProviderEntry::aliased(provider, cast));
        Ok(())
    }
}

/// Runs scope-end lifecycle for every instance in a detached store.
///
/// Alias entries are skipped: their hooks belong to an instance entry in the
/// same store and must not fire twice.
pub(crate) fn drain_store(store: &Store) {
    let entries: Vec<Stored> = {
        let mut guard = store.lock().unwrap();
        guard.drain().map(|(_, stored)| stored).collect()
    };
    for stored in entries {
        if let Stored::Instance(sv) = stored {
            cleanup_value(&sv);
        }
    }
}

/// Scope-end order: `on_scope_ended` first, then `dispose`.
pub(crate) fn cleanup_value(sv: &ServiceValue) {
    guarded("scope-end callback", || sv.hooks.on_scope_ended());
    guarded("dispose callback", || sv.hooks.dispose());
}
