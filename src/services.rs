//! Application-level entry point.

use std::sync::Arc;

use crate::error::LocatorResult;
use crate::host::{EntityId, Host, SceneId};
use crate::locator::{
    EntityResolver, GlobalResolver, InstanceAliaser, SceneResolver, ServiceLocator,
};
use crate::traits::Lifecycle;

/// Owns the application's locator and its reset lifecycle.
///
/// Most code takes a [`ServiceLocator`] clone (or a resolver) and never sees
/// this type; `Services` exists so the embedding application has exactly one
/// place that creates the locator at startup and swaps it out on reset.
///
/// [`reset`](Self::reset) replaces the locator wholesale. Registrations in
/// the old locator are dropped, not disposed: reset models a fresh start
/// (domain reload, test isolation), not an orderly shutdown. Clones of the
/// old locator that are still held keep working against the old tables.
pub struct Services {
    host: Arc<dyn Host>,
    locator: ServiceLocator,
}

impl Services {
    /// Creates the application locator backed by `host`.
    pub fn new(host: Arc<dyn Host>) -> Self {
        let locator = ServiceLocator::new(host.clone());
        Services { host, locator }
    }

    /// The current locator.
    pub fn locator(&self) -> &ServiceLocator {
        &self.locator
    }

    /// Discards the current locator and starts a fresh one on the same
    /// host.
    pub fn reset(&mut self) {
        log::info!("resetting service locator");
        self.locator = ServiceLocator::new(self.host.clone());
    }

    // Convenience pass-throughs for the common bind-and-resolve calls.

    /// Registers a global singleton. See
    /// [`ServiceLocator::register_global_instance`].
    pub fn bind<T: Lifecycle>(&self, instance: Arc<T>) -> LocatorResult<InstanceAliaser<T>> {
        self.locator.register_global_instance(instance)
    }

    /// Registers a scene-owned singleton. See
    /// [`ServiceLocator::register_scene_instance`].
    pub fn bind_to_scene<T: Lifecycle>(
        &self,
        scene: SceneId,
        instance: Arc<T>,
    ) -> LocatorResult<InstanceAliaser<T>> {
        self.locator.register_scene_instance(scene, instance)
    }

    /// Registers an entity-owned singleton. See
    /// [`ServiceLocator::register_entity_instance`].
    pub fn bind_to_entity<T: Lifecycle>(
        &self,
        entity: EntityId,
        instance: Arc<T>,
    ) -> LocatorResult<InstanceAliaser<T>> {
        self.locator.register_entity_instance(entity, instance)
    }

    /// A global-scope resolver.
    pub fn resolver(&self) -> GlobalResolver {
        self.locator.for_global()
    }

    /// A resolver rooted at `scene`.
    pub fn resolver_for_scene(&self, scene: SceneId) -> SceneResolver {
        self.locator.for_scene(scene)
    }

    /// A resolver rooted at `entity`.
    pub fn resolver_for_entity(&self, entity: EntityId, search_hierarchy: bool) -> EntityResolver {
        self.locator.for_entity(entity, search_hierarchy)
    }
}
